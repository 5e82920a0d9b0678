mod answer;
mod record_type;

pub use answer::{Answer, AnswerData, CLASS_IN, INFINITE_TTL, MAX_DOMAIN_LEN};
pub use record_type::RecordType;
