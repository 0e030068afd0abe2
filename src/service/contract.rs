use crate::codec;
use crate::error::ApiError;
use crate::pending::Pending;
use crate::record::{DataClass, Record};
use serde_json::Value;
use std::fmt;

/// Typed CRUD contract for one resource collection
///
/// Implementations must be safe to call from many request coroutines at
/// once; nothing serialises access to a service.
pub trait Service: Send + Sync + 'static {
    type Record: Record;

    /// Descriptor used to decode request bodies for this service.
    fn data_class(&self) -> &'static DataClass {
        <Self::Record as Record>::data_class()
    }

    /// Record stored under `id`, or absent.
    fn get(&self, _id: &str) -> Pending<Self::Record> {
        Pending::failed(ApiError::Unsupported)
    }

    /// All records, in no particular order.
    fn list(&self) -> Pending<Vec<Self::Record>> {
        Pending::failed(ApiError::Unsupported)
    }

    /// Create or overwrite. `None` means the request carried no body.
    fn post(&self, _candidate: Option<Self::Record>) -> Pending<Self::Record> {
        Pending::failed(ApiError::Unsupported)
    }

    /// Store `candidate` under `id`. `None` means the request carried no body.
    fn put(&self, _id: &str, _candidate: Option<Self::Record>) -> Pending<Self::Record> {
        Pending::failed(ApiError::Unsupported)
    }

    /// Remove and return the record under `id`, or absent.
    fn delete(&self, _id: &str) -> Pending<Self::Record> {
        Pending::failed(ApiError::Unsupported)
    }

    /// Remember the current contents for a later [`Service::reset_to_snapshot`].
    fn take_snapshot(&self) {}

    /// Restore the contents captured by the last [`Service::take_snapshot`].
    fn reset_to_snapshot(&self) {}
}

/// One service operation, as selected by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Get { id: String },
    Post,
    Put { id: String },
    Delete { id: String },
}

impl Call {
    /// Path id this call addresses, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Call::Get { id } | Call::Put { id } | Call::Delete { id } => Some(id),
            Call::List | Call::Post => None,
        }
    }

    /// Operation name for logs.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Call::List => "list",
            Call::Get { .. } => "get",
            Call::Post => "post",
            Call::Put { .. } => "put",
            Call::Delete { .. } => "delete",
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}({id})", self.operation()),
            None => write!(f, "{}", self.operation()),
        }
    }
}

/// Type-erased service as stored in the registry
pub trait ResourceHandler: Send + Sync {
    fn data_class(&self) -> &'static DataClass;

    /// Run `call`, decoding `body` first when the call takes one.
    fn invoke(&self, call: &Call, body: &[u8]) -> Pending<Value>;

    fn take_snapshot(&self) {}

    fn reset_to_snapshot(&self) {}
}

/// Adapts a typed [`Service`] to [`ResourceHandler`]
pub struct ServiceHandler<S> {
    service: S,
}

impl<S: Service> ServiceHandler<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

fn encode<T: serde::Serialize>(pending: Pending<T>) -> Pending<Value>
where
    T: Send + 'static,
{
    pending.and_then(|value| codec::to_value(&value))
}

impl<S: Service> ResourceHandler for ServiceHandler<S> {
    fn data_class(&self) -> &'static DataClass {
        self.service.data_class()
    }

    fn invoke(&self, call: &Call, body: &[u8]) -> Pending<Value> {
        match call {
            Call::List => encode(self.service.list()),
            Call::Get { id } => encode(self.service.get(id)),
            Call::Delete { id } => encode(self.service.delete(id)),
            Call::Post => match codec::decode_record::<S::Record>(body) {
                Ok(candidate) => encode(self.service.post(candidate)),
                Err(e) => Pending::failed(e),
            },
            Call::Put { id } => match codec::decode_record::<S::Record>(body) {
                Ok(candidate) => encode(self.service.put(id, candidate)),
                Err(e) => Pending::failed(e),
            },
        }
    }

    fn take_snapshot(&self) {
        self.service.take_snapshot();
    }

    fn reset_to_snapshot(&self) {
        self.service.reset_to_snapshot();
    }
}
