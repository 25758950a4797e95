//! Resource-oriented API surface.
//!
//! One module per backend resource family. Each API struct is a thin
//! dispatcher over the selected [`Backend`](crate::backend::Backend); the
//! calling code never observes which backend served a request apart from
//! documented mock conventions (simulated latency, seeded data).

macro_rules! dispatch {
    ($self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self.backend.as_ref() {
            $crate::backend::Backend::Mock(backend) => backend.$method($($arg),*).await,
            $crate::backend::Backend::Http(backend) => backend.$method($($arg),*).await,
        }
    };
}

mod academic;
mod attendance;
mod auth;
mod departments;
mod enrollment;
mod grading;
mod users;

pub use academic::AcademicApi;
pub use attendance::AttendanceApi;
pub use auth::AuthApi;
pub use departments::DepartmentsApi;
pub use enrollment::EnrollmentApi;
pub use grading::GradingApi;
pub use users::UsersApi;
