//! Minimal text-field forms for the login, register, channel and video
//! draft views. One focused field at a time; cursor movement is char
//! based with the same byte-index mapping the search input uses.

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

#[derive(Debug, Clone)]
pub struct Field {
  pub label: &'static str,
  pub value: String,
  pub cursor: usize,
  /// Render as dots (passwords).
  pub masked: bool,
}

impl Field {
  pub fn new(label: &'static str) -> Self {
    Self { label, value: String::new(), cursor: 0, masked: false }
  }

  pub fn masked(label: &'static str) -> Self {
    Self { label, value: String::new(), cursor: 0, masked: true }
  }

  pub fn with_value(label: &'static str, value: &str) -> Self {
    Self { label, value: value.to_string(), cursor: value.chars().count(), masked: false }
  }
}

#[derive(Debug, Clone)]
pub struct Form {
  pub fields: Vec<Field>,
  pub focused: usize,
}

impl Form {
  pub fn new(fields: Vec<Field>) -> Self {
    Self { fields, focused: 0 }
  }

  pub fn focused_field(&self) -> &Field {
    &self.fields[self.focused]
  }

  fn focused_mut(&mut self) -> &mut Field {
    &mut self.fields[self.focused]
  }

  pub fn value(&self, idx: usize) -> &str {
    &self.fields[idx].value
  }

  pub fn insert_char(&mut self, c: char) {
    let field = self.focused_mut();
    let byte_idx = char_to_byte_index(&field.value, field.cursor);
    field.value.insert(byte_idx, c);
    field.cursor += 1;
  }

  pub fn backspace(&mut self) {
    let field = self.focused_mut();
    if field.cursor > 0 {
      field.cursor -= 1;
      let byte_idx = char_to_byte_index(&field.value, field.cursor);
      field.value.remove(byte_idx);
    }
  }

  pub fn delete(&mut self) {
    let field = self.focused_mut();
    if field.cursor < field.value.chars().count() {
      let byte_idx = char_to_byte_index(&field.value, field.cursor);
      field.value.remove(byte_idx);
    }
  }

  pub fn cursor_left(&mut self) {
    let field = self.focused_mut();
    field.cursor = field.cursor.saturating_sub(1);
  }

  pub fn cursor_right(&mut self) {
    let field = self.focused_mut();
    if field.cursor < field.value.chars().count() {
      field.cursor += 1;
    }
  }

  pub fn cursor_home(&mut self) {
    self.focused_mut().cursor = 0;
  }

  pub fn cursor_end(&mut self) {
    let field = self.focused_mut();
    field.cursor = field.value.chars().count();
  }

  pub fn focus_next(&mut self) {
    self.focused = (self.focused + 1) % self.fields.len();
  }

  pub fn focus_prev(&mut self) {
    self.focused = if self.focused == 0 { self.fields.len() - 1 } else { self.focused - 1 };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6); // past end
  }

  // --- Form editing ---

  fn form() -> Form {
    Form::new(vec![Field::new("Email"), Field::masked("Password")])
  }

  #[test]
  fn typing_inserts_at_cursor() {
    let mut f = form();
    for c in "abc".chars() {
      f.insert_char(c);
    }
    f.cursor_left();
    f.insert_char('x');
    assert_eq!(f.value(0), "abxc");
  }

  #[test]
  fn backspace_and_delete() {
    let mut f = form();
    for c in "abc".chars() {
      f.insert_char(c);
    }
    f.backspace();
    assert_eq!(f.value(0), "ab");
    f.cursor_home();
    f.delete();
    assert_eq!(f.value(0), "b");
  }

  #[test]
  fn focus_wraps_both_ways() {
    let mut f = form();
    f.focus_next();
    assert_eq!(f.focused, 1);
    f.focus_next();
    assert_eq!(f.focused, 0);
    f.focus_prev();
    assert_eq!(f.focused, 1);
  }

  #[test]
  fn prefilled_field_starts_with_cursor_at_end() {
    let field = Field::with_value("Title", "héllo");
    assert_eq!(field.cursor, 5);
  }
}
