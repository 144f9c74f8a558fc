use web_sys::console;

use crate::{error::Error, gl::GL};

/// Multiplier applied to the logical size when scheduling a grow, so
/// that repeated small appends amortize to O(1) reallocations per point.
const GROW_FACTOR: usize = 2;

/// CPU-side bookkeeping for a growable device buffer.
///
/// Tracks the relationship between the latest CPU-side geometry and the
/// device buffer: the capacity currently allocated, the capacity the
/// next `prepare` must grow to, and whether an upload is pending.
/// Capacity is monotonically non-decreasing for the life of an
/// attach/detach span.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CapacityTracker {
    capacity: usize,
    target_capacity: usize,
    dirty: bool,
}

impl CapacityTracker {
    /// Records a replacement of the CPU-side geometry.
    ///
    /// Marks the buffer dirty. A grow is scheduled only when the new
    /// logical size exceeds the allocated capacity; a pending grow is
    /// cancelled again when a later write fits the current allocation,
    /// so oscillating point counts never cause reallocation churn.
    pub(crate) fn record_write(&mut self, byte_len: usize) {
        self.dirty = true;
        if byte_len > self.capacity {
            self.target_capacity = byte_len * GROW_FACTOR;
        } else {
            self.target_capacity = self.capacity;
        }
    }

    /// True when the next `prepare` must reallocate before uploading.
    pub(crate) fn needs_growth(&self) -> bool {
        self.target_capacity > self.capacity
    }

    /// Capacity the next allocation must provide, in bytes.
    pub(crate) fn target_capacity(&self) -> usize {
        self.target_capacity
    }

    /// Bytes currently allocated on the device.
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when the device buffer no longer holds the latest geometry.
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Commits a successful reallocation at the target capacity.
    pub(crate) fn commit_growth(&mut self) {
        self.capacity = self.target_capacity;
    }

    /// Marks the device buffer as holding the latest geometry.
    pub(crate) fn mark_uploaded(&mut self) {
        self.dirty = false;
    }

    /// Resets to the state right after `attach`: a fresh allocation of
    /// `capacity` bytes holding a full upload.
    pub(crate) fn reset(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.target_capacity = capacity;
        self.dirty = false;
    }

    /// Clears all state when the device buffer is released.
    pub(crate) fn release(&mut self) {
        *self = Self::default();
    }
}

/// An owned device-side vertex buffer with explicit release.
///
/// Growth never mutates an existing buffer: callers allocate a new one,
/// upload into it, swap, then release the old one, so no handle is ever
/// referenced after release.
#[derive(Debug)]
pub(crate) struct GeometryBuffer {
    handle: web_sys::WebGlBuffer,
    capacity: usize,
}

impl GeometryBuffer {
    /// Allocates `capacity` bytes of uninitialized `DYNAMIC_DRAW`
    /// storage.
    ///
    /// # Errors
    /// [`Error::OutOfDeviceMemory`] when the device rejects the
    /// allocation; the half-created handle is released before returning.
    pub(crate) fn allocate(gl: &GL, capacity: usize) -> Result<Self, Error> {
        let handle = gl.create_buffer().ok_or(Error::buffer_creation_failed())?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&handle));
        gl.buffer_data_with_i32(GL::ARRAY_BUFFER, capacity as i32, GL::DYNAMIC_DRAW);

        // OUT_OF_MEMORY is the only error bufferData reports for a
        // size-only allocation
        if gl.get_error() == GL::OUT_OF_MEMORY {
            gl.delete_buffer(Some(&handle));
            return Err(Error::buffer_allocation_failed(capacity));
        }

        console::debug_1(&format!("allocated geometry buffer of {capacity} bytes").into());
        Ok(Self { handle, capacity })
    }

    /// Uploads `coords` into the buffer starting at offset 0. The
    /// caller guarantees the data fits within the allocated capacity.
    pub(crate) fn upload(&self, gl: &GL, coords: &[f32]) {
        debug_assert!(std::mem::size_of_val(coords) <= self.capacity);

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.handle));

        unsafe {
            // the view must not outlive this call: no wasm allocations
            // may happen while it is alive
            let view = js_sys::Float32Array::view(coords);
            gl.buffer_sub_data_with_i32_and_array_buffer_view(GL::ARRAY_BUFFER, 0, &view);
        }
    }

    /// Binds the buffer to `ARRAY_BUFFER`.
    pub(crate) fn bind(&self, gl: &GL) {
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.handle));
    }

    /// Releases the device buffer, consuming the wrapper.
    pub(crate) fn delete(self, gl: &GL) {
        gl.delete_buffer(Some(&self.handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_factor_is_double_logical_size() {
        let mut tracker = CapacityTracker::default();
        tracker.reset(24);

        // 3 points = 36 bytes exceed the 24 byte allocation
        tracker.record_write(36);
        assert!(tracker.needs_growth());
        assert_eq!(tracker.target_capacity(), 72);

        tracker.commit_growth();
        assert_eq!(tracker.capacity(), 72);
    }

    #[test]
    fn test_capacity_is_monotonic() {
        let mut tracker = CapacityTracker::default();
        tracker.reset(24);

        let mut last_capacity = tracker.capacity();
        for byte_len in [36, 12, 144, 0, 72, 288] {
            tracker.record_write(byte_len);
            if tracker.needs_growth() {
                tracker.commit_growth();
            }
            tracker.mark_uploaded();

            assert!(tracker.capacity() >= last_capacity);
            assert!(tracker.capacity() >= byte_len);
            last_capacity = tracker.capacity();
        }
    }

    #[test]
    fn test_shrink_never_schedules_growth() {
        let mut tracker = CapacityTracker::default();
        tracker.reset(72);

        tracker.record_write(24);
        assert!(!tracker.needs_growth());
        assert!(tracker.is_dirty());
        assert_eq!(tracker.capacity(), 72);
    }

    #[test]
    fn test_shrink_cancels_pending_growth() {
        let mut tracker = CapacityTracker::default();
        tracker.reset(24);

        tracker.record_write(96);
        assert!(tracker.needs_growth());

        // the larger set was abandoned before prepare ran; the smaller
        // replacement fits, so no reallocation may happen
        tracker.record_write(12);
        assert!(!tracker.needs_growth());
    }

    #[test]
    fn test_dirty_clears_on_upload_only() {
        let mut tracker = CapacityTracker::default();
        tracker.reset(24);
        assert!(!tracker.is_dirty());

        tracker.record_write(12);
        tracker.record_write(24);
        assert!(tracker.is_dirty());

        tracker.mark_uploaded();
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_release_clears_all_state() {
        let mut tracker = CapacityTracker::default();
        tracker.reset(24);
        tracker.record_write(96);

        tracker.release();
        assert_eq!(tracker.capacity(), 0);
        assert_eq!(tracker.target_capacity(), 0);
        assert!(!tracker.is_dirty());
    }
}
