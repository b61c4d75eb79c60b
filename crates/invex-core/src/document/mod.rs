//! Document collaborators around the extraction core: finding a file,
//! reading its text, and persisting the extracted record.

mod loader;
mod locator;
mod writer;

pub use loader::{DocumentLoader, DocumentType, FsDocumentLoader};
pub use locator::{FileLocator, WalkLocator};
pub use writer::{JsonRecordWriter, RecordWriter};
