mod category;
mod ids;
mod params;
mod question;
mod score;
mod settings;

pub use category::{Category, Difficulty, DifficultyFilter};
pub use ids::QuestionId;
pub use params::{
    DEFAULT_QUESTIONS, MAX_QUESTIONS, MIN_QUESTIONS, ParamError, ParsedParams, QuizParams,
    RawQuizParams,
};
pub use question::{OPTION_COUNT, Question, QuestionError, option_letter};
pub use score::{MAX_PLAYER_NAME_LEN, ScoreEntry, ScoreEntryError, normalize_player_name};
pub use settings::QuizSettings;
