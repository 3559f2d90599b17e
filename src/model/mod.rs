//! Domain model — accounts, profiles, the university catalog, shortlist
//! links, todos, and chat history.

pub mod chat;
pub mod profile;
pub mod shortlist;
pub mod todo;
pub mod university;
pub mod user;

pub use chat::{ChatMessage, ChatRole};
pub use profile::{ExamStatus, Profile, ProfileSubmission, SopStatus};
pub use shortlist::{Category, LinkStatus, NewLink, ResolvedLink, ShortlistLink};
pub use todo::{NewTodo, Todo, TodoPatch, TodoStatus};
pub use university::{AcceptanceChance, NewUniversity, RiskLevel, University, UniversityFilter};
pub use user::User;
