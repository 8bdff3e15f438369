mod command_input;
mod edit_form;
mod input;
mod key_result;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use edit_form::{EditForm, FormEvent};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
