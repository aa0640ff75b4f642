mod catalog;
mod pagination;
mod request_status;
mod state;
mod tutor_request;

pub use catalog::{GradeRef, SubjectRef, TutorRef};
pub use pagination::{Page, QueryOptions, SortOrder};
pub use request_status::RequestStatus;
pub use state::AppState;
pub use tutor_request::{
    NewTutorBlock, NewTutorRequest, PopulatedTutorBlock, PopulatedTutorRequest, TutorBlock,
    TutorRequest, TutorRequestFilter,
};
