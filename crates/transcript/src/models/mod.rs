//! Domain models for the transcript client

mod column;
mod row;
mod subject;

pub use column::{ColumnDef, MergeMode};
pub use row::{MessageRow, USER_ID_FIELD};
pub use subject::SubjectId;
