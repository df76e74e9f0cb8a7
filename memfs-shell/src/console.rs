use memfs::{DirEntry, FileType, Stat};

const RESET: &str = "\u{1b}[0m";
const GREEN: &str = "\u{1b}[0;32m";
const BLUE: &str = "\u{1b}[0;34m";
const PURPLE: &str = "\u{1b}[0;35m";

/// Renders a directory listing on one line: directories in blue, symbolic links in
/// purple with their target, regular files in green.
pub fn listing(entries: &[DirEntry], color: bool) -> String {
    let rendered: Vec<String> = entries
        .iter()
        .map(|entry| {
            let (text, paint) = match entry.file_type {
                FileType::Directory => (entry.name.clone(), BLUE),
                FileType::Regular => (entry.name.clone(), GREEN),
                FileType::Symlink => (
                    format!(
                        "{} -> {}",
                        entry.name,
                        entry.target.as_deref().unwrap_or_default()
                    ),
                    PURPLE,
                ),
            };
            if color {
                format!("{}{}{}", paint, text, RESET)
            } else {
                text
            }
        })
        .collect();
    format!("ls: {}", rendered.join(" "))
}

pub fn stat(stat: &Stat) -> String {
    let descriptor = stat
        .descriptor
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "File information: [name = {}; type = {}; descriptor = {}; size = {}; blocks = {}; links = {}",
        stat.name, stat.file_type, descriptor, stat.size, stat.blocks, stat.links
    );
    if let Some(target) = &stat.target {
        line.push_str(&format!("; target = {}", target));
    }
    line.push(']');
    line
}

/// Bytes are shown as decimal values separated by spaces.
pub fn bytes(data: &[u8]) -> String {
    let values: Vec<String> = data.iter().map(|b| b.to_string()).collect();
    values.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, file_type: FileType, target: Option<&str>) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            file_type,
            target: target.map(str::to_string),
        }
    }

    #[test]
    fn plain_listing_shows_link_targets() {
        let entries = vec![
            entry(".", FileType::Directory, None),
            entry("a.txt", FileType::Regular, None),
            entry("s", FileType::Symlink, Some("/")),
        ];
        assert_eq!(listing(&entries, false), "ls: . a.txt s -> /");
    }

    #[test]
    fn colored_listing_wraps_each_entry() {
        let entries = vec![entry("d", FileType::Directory, None)];
        assert_eq!(listing(&entries, true), "ls: \u{1b}[0;34md\u{1b}[0m");
    }

    #[test]
    fn stat_of_directory_has_no_descriptor() {
        let line = stat(&Stat {
            name: "d".to_string(),
            file_type: FileType::Directory,
            descriptor: None,
            size: 0,
            blocks: 0,
            links: 0,
            target: None,
        });
        assert_eq!(
            line,
            "File information: [name = d; type = directory; descriptor = -; size = 0; blocks = 0; links = 0]"
        );
    }

    #[test]
    fn bytes_are_space_separated() {
        assert_eq!(bytes(&[1, 1, 0]), "1 1 0");
        assert_eq!(bytes(&[]), "");
    }
}
