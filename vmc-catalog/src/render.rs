//! Static HTML report of the whole catalog
//!
//! One header row from the field catalog, then one row per record in store
//! order. Values are written verbatim: markup inside a value is not escaped
//! and will be interpreted by the browser.

use crate::error::{CatalogError, Result};
use crate::fields::FieldCatalog;
use crate::store::flat_file::write_file;
use crate::store::{RecordStore, WriteMode};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

const STYLE: &str = "<style>table{font-family:arial,sans-serif;text-align:left;width:100%}\
td,th{border:1px solid #ddd;padding:8px}\
tr:nth-child(even){background-color:#ddd}</style>";

/// Renders and writes the catalog report
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogRenderer {
    mode: WriteMode,
}

impl CatalogRenderer {
    pub fn new(mode: WriteMode) -> Self {
        Self { mode }
    }

    /// Render the full report document
    pub fn render(&self, store: &RecordStore) -> String {
        let mut html = String::from("<!doctypehtml>");
        html.push_str(STYLE);
        html.push_str("<table>\n  <tr>");
        for name in FieldCatalog.names() {
            let _ = write!(html, "<th>{}</th>", name);
        }
        html.push_str("</tr>\n");

        for record in store {
            html.push_str("  <tr>\n");
            for value in record.values() {
                let _ = writeln!(html, "  \t<td>{}</td>", value);
            }
            html.push_str("  </tr>\n");
        }

        html.push_str("</table>\n");
        html
    }

    /// Render `store` and replace the report file at `path`
    pub fn write_report(&self, path: &Path, store: &RecordStore) -> Result<()> {
        let html = self.render(store);
        write_file(path, &html, self.mode).map_err(|source| CatalogError::RenderIo {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote catalog report ({} rows) to {}", store.len(), path.display());
        Ok(())
    }
}
