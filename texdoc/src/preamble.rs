//! Preamble model: package list, font setting and page margins

use std::path::PathBuf;

/// A `\usepackage` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package name (`amsmath`, `tikz`, ...)
    pub name: String,
    /// Option list without brackets (`utf8`, `T1`, ...)
    pub options: Option<String>,
}

impl Package {
    /// Create a package declaration without options
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }

    /// Create a package declaration with an option list
    pub fn with_options(name: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Some(options.into()),
        }
    }

    /// Render the `\usepackage` line
    pub fn render(&self) -> String {
        match &self.options {
            Some(opts) if !opts.is_empty() => format!("\\usepackage[{}]{{{}}}\n", opts, self.name),
            _ => format!("\\usepackage{{{}}}\n", self.name),
        }
    }
}

/// Packages declared in every document, in declaration order
const DEFAULT_PACKAGES: &[(&str, Option<&str>)] = &[
    ("amsmath", None),
    ("amsfonts", None),
    ("amssymb", None),
    ("inputenc", Some("utf8")),
    ("fontenc", Some("T1")),
    ("graphicx", None),
    ("hyperref", None),
    ("tcolorbox", None),
    ("CJKutf8", None),
];

/// Packages replaced by `fontspec`/`xeCJK` when a font file is loaded
pub(crate) const FONTSPEC_SKIPPED: &[&str] = &["CJKutf8", "inputenc", "fontenc"];

/// Ordered package list with idempotent insertion
///
/// Insertion order is preserved. Adding a name that is already present is a
/// no-op and the first-seen options win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageList {
    packages: Vec<Package>,
}

impl PackageList {
    /// Create an empty package list
    pub fn empty() -> Self {
        Self {
            packages: Vec::new(),
        }
    }

    /// Create the default package list
    pub fn with_defaults() -> Self {
        let mut list = Self::empty();
        for (name, options) in DEFAULT_PACKAGES {
            list.add(Package {
                name: (*name).to_string(),
                options: options.map(str::to_string),
            });
        }
        list
    }

    /// Add a package; returns `false` when the name was already declared
    pub fn add(&mut self, package: Package) -> bool {
        if self.contains(&package.name) {
            log::debug!("Package '{}' already declared, skipping", package.name);
            return false;
        }
        self.packages.push(package);
        true
    }

    /// Check whether a package name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p.name == name)
    }

    /// Iterate packages in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Default for PackageList {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Built-in CJK font presets selected through the `CJK` environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinFont {
    /// Mincho (serif), id `min`
    #[default]
    Mincho,
    /// Gothic (sans serif), id `goth`
    Gothic,
}

impl BuiltinFont {
    /// The font id passed to the `CJK` environment
    pub fn id(self) -> &'static str {
        match self {
            Self::Mincho => "min",
            Self::Gothic => "goth",
        }
    }
}

/// Font configuration of a document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontSetting {
    /// Nothing requested; the default built-in font is used
    #[default]
    Default,
    /// A named built-in font preset
    Builtin(BuiltinFont),
    /// A font file loaded through `fontspec`
    File {
        /// Display name used in the font declaration
        name: String,
        /// Provisioned path relative to the output directory
        path: PathBuf,
    },
}

impl FontSetting {
    /// Whether a font file is configured
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Built-in font used for the `CJK` environment, if any
    pub fn builtin(&self) -> Option<BuiltinFont> {
        match self {
            Self::Default => Some(BuiltinFont::default()),
            Self::Builtin(font) => Some(*font),
            Self::File { .. } => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Default => "default font".to_string(),
            Self::Builtin(font) => format!("built-in font '{}'", font.id()),
            Self::File { path, .. } => format!("font file '{}'", path.display()),
        }
    }

    /// Render the font-loading directives for a font file
    pub(crate) fn render_directives(&self) -> Option<String> {
        let Self::File { name, path } = self else {
            return None;
        };
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = path
            .parent()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());
        let dir = if dir.contains(' ') {
            format!("\"{}\"", dir)
        } else {
            dir
        };
        Some(format!(
            "\\setCJKmainfont{{{}}}[Path={}/, UprightFont={}]\n",
            name, dir, file_name
        ))
    }
}

/// Page margins; unset sides keep the document class default
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
}

impl Margins {
    /// Set all four sides to the same dimension
    pub fn uniform(dimension: impl Into<String>) -> Self {
        let d = dimension.into();
        Self {
            top: Some(d.clone()),
            bottom: Some(d.clone()),
            left: Some(d.clone()),
            right: Some(d),
        }
    }

    /// Whether any side differs from the default
    pub fn is_set(&self) -> bool {
        self.top.is_some() || self.bottom.is_some() || self.left.is_some() || self.right.is_some()
    }

    /// Overwrite the sides that are set in `other`
    pub(crate) fn merge(&mut self, other: Margins) {
        if other.top.is_some() {
            self.top = other.top;
        }
        if other.bottom.is_some() {
            self.bottom = other.bottom;
        }
        if other.left.is_some() {
            self.left = other.left;
        }
        if other.right.is_some() {
            self.right = other.right;
        }
    }

    /// Render the `geometry` declaration, if any side is set
    pub(crate) fn render(&self) -> Option<String> {
        let sides = [
            ("top", &self.top),
            ("bottom", &self.bottom),
            ("left", &self.left),
            ("right", &self.right),
        ];
        let options: Vec<String> = sides
            .iter()
            .filter_map(|(side, value)| value.as_ref().map(|v| format!("{}={}", side, v)))
            .collect();
        if options.is_empty() {
            return None;
        }
        Some(format!("\\usepackage[{}]{{geometry}}\n", options.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_render() {
        assert_eq!(Package::new("tikz").render(), "\\usepackage{tikz}\n");
        assert_eq!(
            Package::with_options("inputenc", "utf8").render(),
            "\\usepackage[utf8]{inputenc}\n"
        );
    }

    #[test]
    fn test_package_list_first_options_win() {
        let mut list = PackageList::empty();
        assert!(list.add(Package::with_options("geometry", "a4paper")));
        assert!(!list.add(Package::with_options("geometry", "letterpaper")));
        assert!(!list.add(Package::new("geometry")));
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.iter().next().and_then(|p| p.options.clone()),
            Some("a4paper".to_string())
        );
    }

    #[test]
    fn test_default_packages_order() {
        let list = PackageList::with_defaults();
        let names: Vec<&str> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"amsmath"));
        assert_eq!(names.last(), Some(&"CJKutf8"));
    }

    #[test]
    fn test_font_file_directives() {
        let font = FontSetting::File {
            name: "Noto Sans JP".to_string(),
            path: PathBuf::from("fonts/NotoSansJP-Regular.ttf"),
        };
        assert_eq!(
            font.render_directives().as_deref(),
            Some("\\setCJKmainfont{Noto Sans JP}[Path=fonts/, UprightFont=NotoSansJP-Regular.ttf]\n")
        );
        assert_eq!(FontSetting::Default.render_directives(), None);
    }

    #[test]
    fn test_margins_render_only_set_sides() {
        let margins = Margins {
            top: Some("2cm".to_string()),
            left: Some("1.5cm".to_string()),
            ..Default::default()
        };
        assert_eq!(
            margins.render().as_deref(),
            Some("\\usepackage[top=2cm,left=1.5cm]{geometry}\n")
        );
        assert_eq!(Margins::default().render(), None);
    }
}
