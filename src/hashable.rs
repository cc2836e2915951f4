use std::borrow::Cow;
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;

/// Anything that can take part in a rendezvous as a node.
///
/// The bytes returned are the node's identity: they are fed to the scorer,
/// compared to break ties and compared to find nodes to remove. Two values
/// with the same bytes are the same node as far as the hash is concerned,
/// so an implementation must return the same bytes for the lifetime of the
/// value.
pub trait Hashable {
    fn hash_bytes(&self) -> Cow<'_, [u8]>;
}

impl Hashable for str {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Hashable for String {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Hashable for [u8] {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl Hashable for Vec<u8> {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<const N: usize> Hashable for [u8; N] {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

/// Socket addresses hash as their display form, eg. `10.0.0.1:11211`
impl Hashable for SocketAddr {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.to_string().into_bytes())
    }
}

impl<T: Hashable + ?Sized> Hashable for &T {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        (**self).hash_bytes()
    }
}

impl<T: Hashable + ?Sized> Hashable for Box<T> {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        (**self).hash_bytes()
    }
}

impl<T: Hashable + ?Sized> Hashable for Rc<T> {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        (**self).hash_bytes()
    }
}

impl<T: Hashable + ?Sized> Hashable for Arc<T> {
    fn hash_bytes(&self) -> Cow<'_, [u8]> {
        (**self).hash_bytes()
    }
}
