/// What a component did with a key.
///
/// Views try their components first and fall through to their own bindings
/// on `NotHandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Swallowed, nothing for the view to do
  Handled,
  /// Swallowed, and the view should act on this
  Event(T),
  NotHandled,
}
