//! Turns `///` docs on config structs into comments of a generated TOML file.

use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{Decor, Item, RawString, Table};
use tracing::debug;

use crate::error::{ConfigError, Result};

fn to_comment_block(docs: &str) -> String {
    docs.lines()
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

/// Appends `docs` to whatever comment block already sits above `decor`.
pub fn push_doc_comment(decor: &mut Decor, docs: &str) {
    let block = to_comment_block(docs);
    let existing = decor
        .prefix()
        .and_then(RawString::as_str)
        .unwrap_or_default()
        .to_string();

    let prefix = if existing.trim().is_empty() || existing.ends_with("\n\n") {
        format!("{existing}{block}")
    } else {
        format!("{existing}\n{block}")
    };
    decor.set_prefix(prefix);
}

/// Writes field docs of `T` above every key of `table`.
///
/// Nested tables receive the field's docs on their header. Keys that `T`
/// does not document are left alone.
pub fn annotate_table<T>(table: &mut Table, with_header: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if with_header {
        push_doc_comment(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let name = key.get().to_string();
        let Ok(docs) = T::get_field_docs(&name) else {
            debug!("no docs for `{name}` on {}", type_name::<T>());
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(name)),
            Item::Value(_) => push_doc_comment(key.leaf_decor_mut(), docs),
            Item::Table(sub) => push_doc_comment(sub.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                if let Some(first) = array.iter_mut().next() {
                    push_doc_comment(first.decor_mut(), docs);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_block_lines() {
        assert_eq!(to_comment_block("one\n\ntwo"), "# one\n#\n# two\n");
    }

    #[test]
    fn test_push_doc_comment_on_empty_decor() {
        let mut decor = Decor::new("", "");
        push_doc_comment(&mut decor, "Memory in MiB");
        let prefix = decor.prefix().and_then(|p| p.as_str()).unwrap();
        assert_eq!(prefix, "# Memory in MiB\n");
    }

    #[test]
    fn test_push_doc_comment_separates_blocks() {
        let mut decor = Decor::new("# existing\n", "");
        push_doc_comment(&mut decor, "added");
        let prefix = decor.prefix().and_then(|p| p.as_str()).unwrap();
        assert_eq!(prefix, "# existing\n\n# added\n");
    }
}
