pub mod answer_service;
pub mod credential_store;
pub mod extractor;
pub mod form_writer;
pub mod option_matcher;
pub mod prompt_builder;

pub use answer_service::AnswerService;
pub use credential_store::CredentialStore;
pub use extractor::QuestionExtractor;
pub use form_writer::FormWriter;
