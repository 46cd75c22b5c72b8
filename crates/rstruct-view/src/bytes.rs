use std::cell::Cell;
use std::ops::Range;

/// Scratch size used when copying a field out of a shared-writable buffer.
/// Every numeric kind fits; byte arrays above it fall back to the heap.
const INLINE_SCRATCH: usize = 8;

/// A borrowed window onto the bytes owned by the outermost buffer.
///
/// A view is `Copy`, so carving a sub-view for a nested structure is
/// just index arithmetic on the parent's window. The owner (a caller's
/// slice, a [`StructureBuf`](crate::StructureBuf), a
/// [`SizedRecord`](crate::SizedRecord)) is the arena; the lifetime `'a`
/// ties every view to it.
///
/// Two flavours exist:
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────┐
/// │ View             │ Use                                          │
/// ├──────────────────┼──────────────────────────────────────────────┤
/// │ &'a [u8]         │ read-only; fields decode straight from bytes │
/// │ &'a [Cell<u8>]   │ shared-writable; parent and nested children  │
/// │                  │ write the same bytes through `&` handles     │
/// └──────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// `Cell` makes the writable flavour `!Sync`, so the borrow checker keeps
/// a parent and all of its children on one thread.
pub trait ByteView<'a>: Copy {
    fn len(self) -> usize;

    fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Sub-view over `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds; callers check bounds first.
    #[must_use]
    fn slice(self, range: Range<usize>) -> Self;

    /// Run `f` over the bytes in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds; callers check bounds first.
    fn with_bytes<T>(self, range: Range<usize>, f: impl FnOnce(&[u8]) -> T) -> T;
}

/// A view whose bytes can be overwritten in place.
pub trait WritableView<'a>: ByteView<'a> {
    /// Overwrite `src.len()` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the destination range is out of bounds.
    fn copy_from(self, offset: usize, src: &[u8]);
}

impl<'a> ByteView<'a> for &'a [u8] {
    fn len(self) -> usize {
        <[u8]>::len(self)
    }

    fn slice(self, range: Range<usize>) -> Self {
        &self[range]
    }

    fn with_bytes<T>(self, range: Range<usize>, f: impl FnOnce(&[u8]) -> T) -> T {
        f(&self[range])
    }
}

impl<'a> ByteView<'a> for &'a [Cell<u8>] {
    fn len(self) -> usize {
        <[Cell<u8>]>::len(self)
    }

    fn slice(self, range: Range<usize>) -> Self {
        &self[range]
    }

    fn with_bytes<T>(self, range: Range<usize>, f: impl FnOnce(&[u8]) -> T) -> T {
        let cells = &self[range];
        if cells.len() <= INLINE_SCRATCH {
            let mut scratch = [0u8; INLINE_SCRATCH];
            for (dst, cell) in scratch.iter_mut().zip(cells) {
                *dst = cell.get();
            }
            f(&scratch[..cells.len()])
        } else {
            let copied: Vec<u8> = cells.iter().map(Cell::get).collect();
            f(&copied)
        }
    }
}

impl<'a> WritableView<'a> for &'a [Cell<u8>] {
    fn copy_from(self, offset: usize, src: &[u8]) {
        for (cell, &byte) in self[offset..offset + src.len()].iter().zip(src) {
            cell.set(byte);
        }
    }
}

/// Reinterpret an exclusively borrowed buffer as shared-writable cells.
pub fn cells(buf: &mut [u8]) -> &[Cell<u8>] {
    Cell::from_mut(buf).as_slice_of_cells()
}
