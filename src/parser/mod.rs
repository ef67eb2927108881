/// The DOM-based parser: parses the supplied input and produces a complete [JsonValue]
/// representation of the contents.
///
/// [JsonValue]: crate::JsonValue
pub mod dom;
