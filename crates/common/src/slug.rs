//! URL slugs for groups.

/// Longest slug produced by [`slugify`].
pub const MAX_SLUG_LEN: usize = 100;

/// Generate a URL-safe slug from a title.
///
/// ASCII letters and digits are lowercased, Cyrillic letters are
/// transliterated, everything else becomes a separator. Runs of separators
/// collapse into a single `-` and are trimmed from both ends. May return an
/// empty string when the title has no usable characters.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        let mut buf = [0u8; 4];
        let piece: Option<&str>;

        if c.is_ascii_alphanumeric() {
            piece = Some(&*c.to_ascii_lowercase().encode_utf8(&mut buf));
        } else if let Some(latin) = transliterate(c) {
            piece = Some(latin);
        } else {
            piece = None;
        }

        match piece {
            // Soft and hard signs transliterate to nothing.
            Some("") => {}
            Some(text) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push_str(text);
            }
            None => pending_dash = true,
        }

        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}

/// Append a numeric suffix used to make a taken slug unique.
#[must_use]
pub fn with_suffix(slug: &str, n: u32) -> String {
    let suffix = format!("-{n}");
    let keep = MAX_SLUG_LEN.saturating_sub(suffix.len()).min(slug.len());
    // Slugs are ASCII, so any byte index is a char boundary.
    format!("{}{suffix}", slug[..keep].trim_end_matches('-'))
}

fn transliterate(c: char) -> Option<&'static str> {
    let lower = c.to_lowercase().next()?;
    let latin = match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_title() {
        assert_eq!(slugify("Rust Programming"), "rust-programming");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("snake_case-and-dash"), "snake-case-and-dash");
    }

    #[test]
    fn test_cyrillic_title() {
        assert_eq!(slugify("Тестовая группа"), "testovaya-gruppa");
        assert_eq!(slugify("Объявления"), "obyavleniya");
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_length_is_capped() {
        let title = "a".repeat(500);
        assert_eq!(slugify(&title).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(with_suffix("cats", 2), "cats-2");
        let long = "b".repeat(MAX_SLUG_LEN);
        let suffixed = with_suffix(&long, 12);
        assert_eq!(suffixed.len(), MAX_SLUG_LEN);
        assert!(suffixed.ends_with("-12"));
    }
}
