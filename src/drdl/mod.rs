pub mod errors;
pub mod io;
pub mod model;
pub mod stage;

pub use errors::DrdlError;
pub use io::{load_documents, parse_documents, render_documents, save_documents, DrdlFormat};
pub use model::{Column, Database, DrdlDocument, Table};
pub use stage::Stage;
