pub use error::EngineError;
pub use members::Member;
pub use ops::{Engine, EngineBuilder};
pub use payment_logs::{LogKind, PaymentLog};
pub use terms::Term;

mod error;
mod members;
mod ops;
mod payment_logs;
mod terms;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
