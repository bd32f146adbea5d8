//! Capturing wgpu creation errors instead of letting them reach the
//! device's uncaptured-error handler (which panics by default).

/// Runs `create` inside validation and out-of-memory error scopes.
///
/// Returns the value, or the first error either scope caught. The value is
/// dropped on error; it refers to an invalid wgpu object.
pub(crate) fn capture_errors<T>(
    device: &wgpu::Device,
    create: impl FnOnce() -> T,
) -> Result<T, wgpu::Error> {
    let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = create();

    // Innermost scope first.
    let validation = pollster::block_on(validation.pop());
    let oom = pollster::block_on(oom.pop());

    match validation.or(oom) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}
