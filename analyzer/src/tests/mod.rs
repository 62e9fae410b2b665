#[cfg(test)]
#[macro_use]
mod common;
#[cfg(test)]
mod test_errors;
#[cfg(test)]
mod test_line_index;
#[cfg(test)]
mod test_scope;
