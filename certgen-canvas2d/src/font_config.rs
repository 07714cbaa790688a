use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Font configuration for drawing surfaces.
///
/// Describes where fonts come from using only standard library types. It is
/// turned into a concrete [`fontdb::Database`] once by [`FontConfig::resolve`],
/// and the resolved database is cloned into every surface.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Custom font files to register.
    pub custom_fonts: Vec<CustomFont>,
    /// Mappings from generic CSS family names to concrete font family names.
    pub generic_families: GenericFamilyMap,
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Raw font file data (TTF/OTF). Arc-wrapped for cheap cloning.
#[derive(Clone, Debug)]
pub struct CustomFont {
    pub data: Arc<Vec<u8>>,
}

/// Mappings from generic CSS family names to concrete families, in priority order.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub serif: Vec<String>,
    pub sans_serif: Vec<String>,
    pub monospace: Vec<String>,
}

impl GenericFamilyMap {
    /// Browser-like defaults. Arabic-capable families come early in the
    /// sans-serif list since certificate names are frequently Arabic.
    pub fn defaults() -> Self {
        Self {
            sans_serif: vec![
                "Segoe UI".into(),
                "Arial".into(),
                "Noto Sans Arabic".into(),
                "DejaVu Sans".into(),
                "Liberation Sans".into(),
            ],
            serif: vec![
                "Times New Roman".into(),
                "Noto Naskh Arabic".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            monospace: vec![
                "Courier New".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
        }
    }
}

impl FontConfig {
    /// Resolve this configuration into a concrete font database.
    ///
    /// This performs the expensive system font scan once; the result can be
    /// cloned into any number of surfaces.
    pub fn resolve(&self) -> ResolvedFontConfig {
        ResolvedFontConfig {
            fontdb: font_config_to_fontdb(self),
        }
    }
}

/// A [`FontConfig`] resolved into a font database.
///
/// Cloning clones the in-memory database without rescanning the filesystem.
#[derive(Clone)]
pub struct ResolvedFontConfig {
    pub(crate) fontdb: fontdb::Database,
}

impl ResolvedFontConfig {
    /// Number of font faces available.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Whether a face with the given family name is registered.
    pub fn has_family(&self, family: &str) -> bool {
        has_family(&self.fontdb, family)
    }
}

impl std::fmt::Debug for ResolvedFontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFontConfig")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

pub(crate) fn has_family(db: &fontdb::Database, family: &str) -> bool {
    db.faces().any(|face| {
        face.families
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(family))
    })
}

fn font_config_to_fontdb(config: &FontConfig) -> fontdb::Database {
    let mut db = fontdb::Database::new();

    if config.load_system_fonts {
        db.load_system_fonts();
    }

    for dir in &config.font_dirs {
        db.load_fonts_dir(dir);
    }

    for font in &config.custom_fonts {
        db.load_font_data(font.data.as_ref().clone());
    }

    apply_generic_families(&mut db, &config.generic_families);
    log::debug!("Resolved font database with {} faces", db.len());

    db
}

/// Point each generic family at the first available concrete family.
fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(fam, _lang)| fam.clone()))
        .collect();
    let first_available = |list: &[String]| list.iter().find(|f| available.contains(*f)).cloned();

    if let Some(family) = first_available(&families.sans_serif) {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = first_available(&families.serif) {
        db.set_serif_family(family);
    }
    if let Some(family) = first_available(&families.monospace) {
        db.set_monospace_family(family);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_font_config() {
        let config = FontConfig::default();
        assert!(config.custom_fonts.is_empty());
        assert!(config.load_system_fonts);
        assert!(config.font_dirs.is_empty());
        assert_eq!(config.generic_families.sans_serif[0], "Segoe UI");
    }

    #[test]
    fn test_no_system_fonts_resolves_empty() {
        let config = FontConfig {
            load_system_fonts: false,
            ..FontConfig::default()
        };
        let resolved = config.resolve();
        assert_eq!(resolved.face_count(), 0);
        assert!(!resolved.has_family("Arial"));
    }

    #[test]
    fn test_invalid_custom_font_is_skipped() {
        let config = FontConfig {
            load_system_fonts: false,
            custom_fonts: vec![CustomFont {
                data: Arc::new(vec![0u8; 64]),
            }],
            ..FontConfig::default()
        };
        assert_eq!(config.resolve().face_count(), 0);
    }
}
