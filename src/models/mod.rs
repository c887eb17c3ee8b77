pub mod booking;
pub mod movie;
pub mod payment;
pub mod seat;
pub mod show;
pub mod theatre;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use movie::Movie;
pub use payment::{Payment, PaymentStatus};
pub use seat::Seat;
pub use show::Show;
pub use theatre::Theatre;
pub use user::User;
