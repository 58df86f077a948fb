mod de;
pub mod document;
pub mod enums;
pub mod error;
pub mod ids;
pub mod options;
pub mod question;
pub mod response;
pub mod schema;
pub mod value;

pub use document::{load_responses_path, load_responses_str};
pub use enums::{AnswerKind, MeasurementType, QuestionType};
pub use error::{ModelError, Result};
pub use ids::SourceId;
pub use options::{DEFAULT_MAX_STRING_WIDTH, OutputFormat, ProcessingOptions};
pub use question::{QuestionDefinition, ValueLabels};
pub use response::{AnswerValue, RawAnswer, RawResponse};
pub use schema::{
    Choice, Element, LocalizedText, MatrixColumn, MatrixElement, MatrixRow, NumberElement, Page,
    RadiogroupElement, SurveySchema, TextElement,
};
pub use value::{CellValue, MISSING_CODE};
