//! Font sources for the raster surface.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Where [`RasterSurface`](crate::RasterSurface) finds its fonts.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Raw font files (TTF/OTF) registered before any directory or system font.
    pub custom_fonts: Vec<Arc<Vec<u8>>>,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Family used when a requested face name has no match.
    pub fallback_face: String,
    /// Concrete families for the generic names, in priority order.
    pub generic_families: GenericFamilies,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            font_dirs: Vec::new(),
            load_system_fonts: true,
            fallback_face: "sans-serif".to_string(),
            generic_families: GenericFamilies::defaults(),
        }
    }
}

/// Priority lists for the generic face names `serif`, `sans-serif` and `monospace`.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilies {
    pub serif: Vec<String>,
    pub sans_serif: Vec<String>,
    pub monospace: Vec<String>,
}

impl GenericFamilies {
    pub fn defaults() -> Self {
        Self {
            serif: vec![
                "Times New Roman".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            sans_serif: vec![
                "Arial".into(),
                "Liberation Sans".into(),
                "DejaVu Sans".into(),
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
    /// A configuration that loads nothing but `fonts`.
    pub fn from_font_data(fonts: Vec<Vec<u8>>) -> Self {
        Self {
            custom_fonts: fonts.into_iter().map(Arc::new).collect(),
            load_system_fonts: false,
            ..Self::default()
        }
    }

    /// Scan and register every configured font source once.
    pub fn resolve(&self) -> ResolvedFontConfig {
        ResolvedFontConfig::new(self)
    }
}

/// A [`FontConfig`] loaded into a font database shared by raster surfaces.
#[derive(Clone)]
pub struct ResolvedFontConfig {
    pub(crate) fontdb: Arc<fontdb::Database>,
    pub(crate) fallback_face: String,
}

impl ResolvedFontConfig {
    pub fn new(config: &FontConfig) -> Self {
        let mut db = fontdb::Database::new();
        for font in &config.custom_fonts {
            db.load_font_data(font.as_ref().clone());
        }
        for dir in &config.font_dirs {
            db.load_fonts_dir(dir);
        }
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        apply_generic_families(&mut db, &config.generic_families);
        log::debug!(target: "vwgraphics", "font database holds {} faces", db.len());
        Self {
            fontdb: Arc::new(db),
            fallback_face: config.fallback_face.clone(),
        }
    }

    /// Number of font faces available.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fontdb.is_empty()
    }
}

/// Map a face name onto a fontdb family, honoring the generic names.
pub(crate) fn family_for(face_name: &str) -> fontdb::Family<'_> {
    match face_name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" | "sans serif" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        _ => fontdb::Family::Name(face_name),
    }
}

/// Point each generic family at the first listed family the database has.
fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilies) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _lang)| name.clone()))
        .collect();
    let first = |list: &[String]| list.iter().find(|f| available.contains(*f)).cloned();

    if let Some(family) = first(&families.serif) {
        db.set_serif_family(family);
    }
    if let Some(family) = first(&families.sans_serif) {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = first(&families.monospace) {
        db.set_monospace_family(family);
    }
}
