/// The element whose content the router owns.
///
/// Every render pass clears the mount point and then appends at most
/// one element.
pub trait MountPoint<E> {
    /// Remove everything currently mounted.
    fn clear(&mut self);

    fn append(&mut self, element: E);
}

impl<E> MountPoint<E> for Vec<E> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn append(&mut self, element: E) {
        self.push(element);
    }
}

impl<E, M: MountPoint<E> + ?Sized> MountPoint<E> for &mut M {
    fn clear(&mut self) {
        (**self).clear();
    }

    fn append(&mut self, element: E) {
        (**self).append(element);
    }
}
