pub mod question;
pub mod session;

pub use question::{ChoiceOption, QuestionDescriptor, QuestionKind, RawQuestion};
pub use session::{AnswerRecord, FillOutcome, FillSession, SessionStats};
