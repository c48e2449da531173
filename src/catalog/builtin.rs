use std::time::Duration;

use super::model::{Catalog, CatalogError, TrackDescriptor, WindowEnd};

/// `(id, asset, name, start seconds, end seconds)`; `None` plays to the end.
const BUILTIN_TRACKS: &[(u32, &str, &str, u64, Option<u64>)] = &[
    (1, "/1-Intro.mp3", "Intro", 0, None),
    (2, "/2-Alone-Marshmello.mp3", "Alone - Marshmello", 0, Some(18)),
    (3, "/3-Mr. Blue Sky.mp3", "Mr. Blue Sky", 0, Some(25)),
    (
        4,
        "/4-Música de Fondo para Podcast.mp3",
        "Música de Fondo para Podcast",
        0,
        None,
    ),
    (5, "/5-Olvida La Amargura.mp3", "Olvida La Amargura", 0, Some(74)),
    (
        6,
        "/6-Noticias  Música Ambiental.mp3",
        "Noticias Música Ambiental",
        0,
        None,
    ),
    (
        7,
        "/7-Más de 60 Tonos de Notificaciones.mp3",
        "Más de 60 Tonos de Notificaciones",
        0,
        None,
    ),
    (
        8,
        "/8-Sonido de Teclado de Celular.mp3",
        "Sonido de Teclado de Celular",
        0,
        None,
    ),
    (9, "/9-Photograph-Ed Sheeran.mp3", "Photograph - Ed Sheeran", 0, Some(15)),
    (
        10,
        "/10-SPAGHETTI-LE SSERAFIM.mp3",
        "SPAGHETTI - LE SSERAFIM",
        65,
        Some(73),
    ),
    (
        11,
        "/11-Noticias  Música Ambiental Para Videos.mp3",
        "Noticias Música Ambiental Para Videos",
        0,
        Some(25),
    ),
    (
        12,
        "/12-En el mar - Carlos Argetino.mp3",
        "En el mar - Carlos Argetino",
        12,
        Some(22),
    ),
    (13, "/13-fondo feliz.mp3", "Fondo Feliz", 0, None),
    (14, "/14-Bazar - flans.mp3", "Bazar - Flans", 0, Some(9)),
    (15, "/15-Mr. Blue Sky.mp3", "Mr. Blue Sky", 0, Some(30)),
    (
        16,
        "/16-Color Esperanza - Diego Torres .mp3",
        "Color Esperanza - Diego Torres",
        42,
        Some(74),
    ),
    (
        17,
        "/17-Where No One Goes - Jónsi.mp3",
        "Where No One Goes - Jónsi",
        0,
        Some(22),
    ),
    (18, "/18-Hear Me Now.mp3", "Hear Me Now", 0, None),
    (
        19,
        "/19-Coldplay - Soft Piano.mp3",
        "Coldplay - Soft Piano",
        0,
        None,
    ),
];

impl Catalog {
    /// The catalog shipped with the player.
    pub fn builtin() -> Result<Self, CatalogError> {
        let tracks = BUILTIN_TRACKS
            .iter()
            .map(|&(id, asset, name, start, end)| {
                let window_end = match end {
                    Some(secs) => WindowEnd::At(Duration::from_secs(secs)),
                    None => WindowEnd::NaturalEnd,
                };
                TrackDescriptor::new(id, asset, name, Duration::from_secs(start), window_end)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Catalog::new(tracks)
    }
}
