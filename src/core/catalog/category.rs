//! File categories derived from extensions.

use serde::{Deserialize, Serialize};

/// The closed set of file categories.
///
/// Derived deterministically from the extension; unrecognized
/// extensions fall into `Misc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Images,
    Documents,
    Spreadsheets,
    Presentations,
    Audio,
    Video,
    Archives,
    Code,
    Data,
    Executables,
    Fonts,
    Design,
    #[serde(rename = "3D")]
    ThreeD,
    #[serde(rename = "eBooks")]
    Ebooks,
    Misc,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::Images,
        Category::Documents,
        Category::Spreadsheets,
        Category::Presentations,
        Category::Audio,
        Category::Video,
        Category::Archives,
        Category::Code,
        Category::Data,
        Category::Executables,
        Category::Fonts,
        Category::Design,
        Category::ThreeD,
        Category::Ebooks,
        Category::Misc,
    ];

    /// Classify a lowercased extension (including the leading dot).
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            ".jpg" | ".jpeg" | ".png" | ".gif" | ".bmp" | ".tiff" | ".webp" | ".svg" | ".ico" => {
                Category::Images
            }
            ".pdf" | ".doc" | ".docx" | ".txt" | ".rtf" | ".odt" | ".md" | ".tex" => {
                Category::Documents
            }
            ".xls" | ".xlsx" | ".csv" | ".ods" | ".numbers" => Category::Spreadsheets,
            ".ppt" | ".pptx" | ".key" | ".odp" => Category::Presentations,
            ".mp3" | ".wav" | ".flac" | ".m4a" | ".aac" | ".ogg" | ".wma" => Category::Audio,
            ".mp4" | ".avi" | ".mov" | ".wmv" | ".mkv" | ".flv" | ".webm" | ".m4v" => {
                Category::Video
            }
            ".zip" | ".rar" | ".7z" | ".tar" | ".gz" | ".bz2" => Category::Archives,
            ".py" | ".js" | ".html" | ".css" | ".java" | ".c" | ".cpp" | ".php" | ".rb"
            | ".go" | ".ts" | ".swift" | ".kt" => Category::Code,
            ".json" | ".xml" | ".yaml" | ".yml" | ".sql" | ".db" | ".sqlite" => Category::Data,
            ".exe" | ".msi" | ".app" | ".bat" | ".sh" | ".command" => Category::Executables,
            ".ttf" | ".otf" | ".woff" | ".woff2" | ".eot" => Category::Fonts,
            ".psd" | ".ai" | ".xd" | ".sketch" | ".fig" | ".afdesign" => Category::Design,
            ".obj" | ".fbx" | ".blend" | ".stl" | ".3ds" | ".max" => Category::ThreeD,
            ".epub" | ".mobi" | ".azw" | ".azw3" | ".ibooks" => Category::Ebooks,
            _ => Category::Misc,
        }
    }

    /// The display label, as used in destination folders and the
    /// catalog document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Spreadsheets => "Spreadsheets",
            Category::Presentations => "Presentations",
            Category::Audio => "Audio",
            Category::Video => "Video",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Data => "Data",
            Category::Executables => "Executables",
            Category::Fonts => "Fonts",
            Category::Design => "Design",
            Category::ThreeD => "3D",
            Category::Ebooks => "eBooks",
            Category::Misc => "Misc",
        }
    }

    /// Match a folder name against the category labels, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_extensions_are_classified() {
        assert_eq!(Category::from_extension(".jpg"), Category::Images);
        assert_eq!(Category::from_extension(".docx"), Category::Documents);
        assert_eq!(Category::from_extension(".csv"), Category::Spreadsheets);
        assert_eq!(Category::from_extension(".mp3"), Category::Audio);
        assert_eq!(Category::from_extension(".zip"), Category::Archives);
        assert_eq!(Category::from_extension(".rs"), Category::Misc);
    }

    #[test]
    fn empty_extension_is_misc() {
        assert_eq!(Category::from_extension(""), Category::Misc);
    }

    #[test]
    fn labels_round_trip_case_insensitively() {
        assert_eq!(Category::from_label("images"), Some(Category::Images));
        assert_eq!(Category::from_label("EBOOKS"), Some(Category::Ebooks));
        assert_eq!(Category::from_label("3d"), Some(Category::ThreeD));
        assert_eq!(Category::from_label("Downloads"), None);
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&Category::ThreeD).unwrap();
        assert_eq!(json, "\"3D\"");
        let back: Category = serde_json::from_str("\"eBooks\"").unwrap();
        assert_eq!(back, Category::Ebooks);
    }
}
