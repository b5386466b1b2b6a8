mod category;
mod challenge;
mod customer;
mod goal;
mod id;
mod id_generator;
mod transaction;

pub use category::{Category, UnknownCategory};
pub use challenge::{
    Challenge, ChallengeScope, CheckIn, CheckInStatus, Hack, MAX_DURATION_DAYS,
};
pub use customer::{AgeBand, CustomerProfile};
pub use goal::{Contribution, SavingsGoal};
pub use id::{Id, IdError};
pub use id_generator::{FixedIdGenerator, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use transaction::{Transaction, TransactionKind};
