mod bank;
mod category;
mod ids;
mod question;
mod screen;
mod session;

pub use bank::{BankError, BankRecord, QuestionBank};
pub use category::{Category, CategoryError, CategoryRecord};
pub use ids::{CategoryId, ParseIdError};
pub use question::{Question, QuestionError, QuestionRecord};
pub use screen::Screen;
pub use session::{AnswerRecord, Session};
