// internal modules
use crate::error::{MiliError, Result};
use crate::format::MiliFileFormat;
use crate::library::MiliDatabase;
use crate::utils::*;

// external crates
use log::{debug, trace};

/// Suffix widths tried, in order, for the domain files of a family
const DOMAIN_SUFFIX_WIDTHS: [usize; 4] = [3, 4, 5, 6];

/// Database handles
impl MiliFileFormat {
    /// Open the database of a domain, doing nothing if it is already open
    ///
    /// A single domain family is opened by its root name. Domain files of
    /// larger families are numbered with a zero padded suffix whose width
    /// depends on the producing run, so every width is tried in turn.
    pub fn open_db(&mut self, dom: usize) -> Result<()> {
        self.check_domain(dom)?;
        if self.dbs[dom].is_some() {
            return Ok(());
        }

        let candidates: Vec<String> = match self.n_domains {
            1 => vec![self.family_root.clone()],
            _ => DOMAIN_SUFFIX_WIDTHS
                .iter()
                .map(|width| family_member(&self.family_root, dom, *width))
                .collect(),
        };

        let mut opened = None;
        for name in &candidates {
            match self.library.open(&self.family_path, name) {
                Ok(db) => {
                    debug!("Opened domain {dom} as {name}");
                    opened = Some(db);
                    break;
                }
                Err(e) => trace!("Could not open {name}: {e}"),
            }
        }

        let Some(mut db) = opened else {
            let last = candidates.last().cloned().unwrap_or_default();
            return Err(MiliError::InvalidFiles(last));
        };

        Self::check_state_record_formats(db.as_mut())?;
        self.dbs[dom] = Some(db);
        Ok(())
    }

    /// Only families with a single state record format are supported
    fn check_state_record_formats(db: &mut dyn MiliDatabase) -> Result<()> {
        let n_formats = match db.state_record_formats() {
            Ok(n) => n,
            Err(e) => {
                db.close().ok();
                return Err(MiliError::ImproperUse(f!("could not query the family: {e}")));
            }
        };

        if n_formats > 1 {
            db.close().ok();
            return Err(MiliError::ImproperUse(f!(
                "{n_formats} state record formats found, only one is supported"
            )));
        }
        Ok(())
    }

    /// The open database of a domain
    pub(crate) fn db(&self, dom: usize) -> Result<&dyn MiliDatabase> {
        self.dbs
            .get(dom)
            .and_then(|db| db.as_deref())
            .ok_or_else(|| MiliError::ImproperUse(f!("domain {dom} has not been opened")))
    }
}
