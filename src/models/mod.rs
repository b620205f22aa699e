pub mod email;
pub mod invoice;
pub mod notification;
pub mod task;
pub mod user;

pub use email::{Email, EmailChanges, NewEmail};
pub use invoice::{Invoice, InvoiceChanges, InvoiceState, NewInvoice};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use task::{NewTask, Task, TaskChanges, TaskPhase};
pub use user::{Role, User};
