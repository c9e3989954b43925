pub mod camel;
pub mod channel;
pub mod cloudevent;
pub mod delivery;
pub mod error;
pub mod notification;
pub mod subscription;

pub use camel::to_lower_camel_case;
pub use channel::Channel;
pub use cloudevent::{CloudEvent, CloudEventRecord};
pub use delivery::{
    truncate_exception, AuditParent, DeliveryResponse, ScheduledWork, WorkKind, EXCEPTION_MAX_LEN,
};
pub use error::{CoreError, ValidationError};
pub use notification::{NotificationPayload, NotificationRecord};
pub use subscription::{
    AuthProfile, ClientCertificate, CloudEventFilter, CloudEventFilterGroup, Filter, FilterGroup,
    Subscription,
};
