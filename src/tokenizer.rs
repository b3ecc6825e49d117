//! HTML5 tokenizer
//!
//! Converts an HTML character stream into a flat token sequence using a
//! subset of the WHATWG tokenization state machine: tags with attributes,
//! text with character references, comments, and CDATA sections. No tree
//! construction. Malformed input never fails; it degrades to literal text
//! or is silently dropped, the way browsers treat it.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

/// Attribute map of a start tag.
///
/// `BTreeMap` keeps iteration order deterministic; HTML attribute order
/// carries no meaning.
pub type AttributeMap = BTreeMap<String, String>;

/// Tokens emitted by [`Html5Tokenizer`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Token {
    /// `<!DOCTYPE ...>` declaration. Reserved: DOCTYPE parsing is not
    /// wired up, such declarations currently degrade to [`Token::Comment`]
    Doctype {
        /// Root element name
        name: Option<String>,
        /// PUBLIC identifier
        public_id: Option<String>,
        /// SYSTEM identifier
        system_id: Option<String>,
        /// Quirks-mode flag
        force_quirks: bool,
    },
    /// Opening tag, e.g. `<a href="x">` or `<br/>`
    StartTag {
        /// Lower-cased tag name
        name: String,
        /// `true` for `<tag/>` forms
        self_closing: bool,
        /// Attributes, `None` when the tag has none
        attributes: Option<AttributeMap>,
    },
    /// Closing tag, e.g. `</a>`
    EndTag {
        /// Lower-cased tag name
        name: String,
    },
    /// Comment contents, without the `<!--`/`-->` delimiters
    Comment(String),
    /// Run of character data, with character references resolved
    Text(String),
    /// End of input. Reserved: [`Html5Tokenizer::tokenize`] returns a
    /// finite list, so exhaustion marks the end instead
    Eof,
}

/// Tokenization states, a subset of the WHATWG machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Data,
    CharacterReference,
    TagOpen,
    EndTagOpen,
    TagName,
    SelfClosingStartTag,
    AttributeNameBefore,
    AttributeName,
    AttributeNameAfter,
    AttributeValueBefore,
    AttributeValueSingleQuote,
    AttributeValueDoubleQuote,
    AttributeValueUnquoted,
    AttributeValueAfter,
    MarkupDeclarationOpen,
    BogusComment,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentEndDash,
    CommentEnd,
    CommentEndBang,
    Cdata,
    CdataEndBracket,
    CdataEndTag,
}

/// Sub-state of the character-reference machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharRefState {
    Named,
    Number,
    HexNumber,
}

/// Single-pass HTML5 tokenizer.
///
/// Consumes one input string scalar by scalar and emits tokens in
/// document order. One instance per input; state is mutated in place.
///
/// # Example
/// ```
/// use parsekit::{tokenize_html, Token};
///
/// let tokens = tokenize_html("<p>hi</p>");
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1], Token::Text("hi".into()));
/// ```
pub struct Html5Tokenizer {
    scalars: Vec<char>,
    pos: usize,

    state: State,
    /// Return stack for sub-states (character reference, tag name)
    state_stack: Vec<State>,
    char_ref_state: CharRefState,

    /// Pending text, comment data, or attribute value
    text_buf: String,
    /// Character-reference name/digit accumulator
    char_buf: String,
    tag_name: String,
    attr_name: String,
    attrs: Option<AttributeMap>,
}

/// Tokenize a complete HTML string.
pub fn tokenize_html(html: &str) -> Vec<Token> {
    Html5Tokenizer::new(html).tokenize()
}

impl Html5Tokenizer {
    /// Create a tokenizer over a complete HTML string.
    pub fn new(html: &str) -> Self {
        Self {
            scalars: html.chars().collect(),
            pos: 0,
            state: State::Data,
            state_stack: Vec::new(),
            char_ref_state: CharRefState::Named,
            text_buf: String::new(),
            char_buf: String::new(),
            tag_name: String::new(),
            attr_name: String::new(),
            attrs: None,
        }
    }

    /// Run the machine over the whole input and collect the tokens.
    ///
    /// Never fails. Text still pending when the input ends in the data
    /// state is flushed as a final [`Token::Text`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut result = Vec::new();

        while let Some(c) = self.next_scalar() {
            if let Some(token) = self.consume(c) {
                result.push(token);
            }
        }

        if self.state == State::Data && !self.text_buf.is_empty() {
            result.push(Token::Text(mem::take(&mut self.text_buf)));
        }

        result
    }

    fn next_scalar(&mut self) -> Option<char> {
        let c = self.scalars.get(self.pos).copied()?;
        self.pos += 1;
        Some(c)
    }

    fn pop_state(&mut self) -> State {
        self.state_stack.pop().unwrap_or(State::Data)
    }

    fn consume(&mut self, c: char) -> Option<Token> {
        match self.state {
            State::Data => self.on_data(c),
            State::CharacterReference => {
                if let Some(resolved) = self.on_char_ref(c) {
                    self.text_buf.push(resolved);
                }
                None
            }
            State::TagOpen => self.on_tag_open(c),
            State::EndTagOpen => self.on_end_tag_open(c),
            State::TagName => self.on_tag_name(c),
            State::SelfClosingStartTag => self.on_self_closing_start_tag(c),
            State::AttributeNameBefore => self.on_attribute_name_before(c),
            State::AttributeName => self.on_attribute_name(c),
            State::AttributeNameAfter => self.on_attribute_name_after(c),
            State::AttributeValueBefore => self.on_attribute_value_before(c),
            State::AttributeValueSingleQuote => self.on_attribute_value(c, Some('\'')),
            State::AttributeValueDoubleQuote => self.on_attribute_value(c, Some('"')),
            State::AttributeValueUnquoted => self.on_attribute_value(c, None),
            State::AttributeValueAfter => self.on_attribute_value_after(c),
            State::MarkupDeclarationOpen => self.on_markup_declaration_open(c),
            State::BogusComment => self.on_bogus_comment(c),
            State::CommentStart => self.on_comment_start(c),
            State::CommentStartDash => self.on_comment_start_dash(c),
            State::Comment => self.on_comment(c),
            State::CommentEndDash => self.on_comment_end_dash(c),
            State::CommentEnd => self.on_comment_end(c),
            State::CommentEndBang => self.on_comment_end_bang(c),
            State::Cdata => self.on_cdata(c),
            State::CdataEndBracket => self.on_cdata_end_bracket(c),
            State::CdataEndTag => self.on_cdata_end_tag(c),
        }
    }

    fn on_data(&mut self, c: char) -> Option<Token> {
        match c {
            '&' => {
                self.state_stack.push(self.state);
                self.state = State::CharacterReference;
                None
            }
            '<' => {
                self.state = State::TagOpen;
                self.tag_name.clear();
                if self.text_buf.is_empty() {
                    None
                } else {
                    Some(Token::Text(mem::take(&mut self.text_buf)))
                }
            }
            _ => {
                self.text_buf.push(c);
                None
            }
        }
    }

    /// Character-reference sub-machine. Returns the resolved scalar on
    /// `;`, `None` while accumulating or on abort.
    fn on_char_ref(&mut self, c: char) -> Option<char> {
        match c {
            // unterminated reference: drop it, including this scalar
            '\t' | '\n' | ' ' | '<' | '&' => {
                self.state = self.pop_state();
                self.char_ref_state = CharRefState::Named;
                self.char_buf.clear();
                None
            }
            '#' => {
                self.char_ref_state = CharRefState::Number;
                None
            }
            'x' if self.char_ref_state == CharRefState::Number => {
                self.char_ref_state = CharRefState::HexNumber;
                None
            }
            ';' => {
                let resolved = match self.char_ref_state {
                    CharRefState::Number => numeric_char(&self.char_buf, 10),
                    CharRefState::HexNumber => numeric_char(&self.char_buf, 16),
                    CharRefState::Named => named_char(&self.char_buf),
                };
                self.state = self.pop_state();
                self.char_ref_state = CharRefState::Named;
                self.char_buf.clear();
                Some(resolved)
            }
            _ => {
                self.char_buf.push(c);
                None
            }
        }
    }

    fn on_tag_open(&mut self, c: char) -> Option<Token> {
        self.attrs = None;

        match c {
            '!' => {
                self.state = State::MarkupDeclarationOpen;
                None
            }
            '/' => {
                self.state = State::EndTagOpen;
                None
            }
            'a'..='z' | 'A'..='Z' => {
                self.tag_name.push(c.to_ascii_lowercase());
                self.state_stack.push(self.state);
                self.state = State::TagName;
                None
            }
            '?' => {
                self.state = State::BogusComment;
                None
            }
            _ => {
                // not a tag after all: the `<` becomes literal text and
                // this scalar is reprocessed in the data state. The text
                // buffer was flushed on entry, so reprocessing cannot emit.
                self.state = State::Data;
                let _ = self.consume(c);
                Some(Token::Text(String::from("<")))
            }
        }
    }

    fn on_end_tag_open(&mut self, c: char) -> Option<Token> {
        match c {
            'a'..='z' | 'A'..='Z' => {
                self.tag_name.push(c.to_ascii_lowercase());
                self.state_stack.push(self.state);
                self.state = State::TagName;
            }
            // missing end tag name: dropped silently
            '>' => self.state = State::Data,
            _ => self.state = State::BogusComment,
        }
        None
    }

    fn on_tag_name(&mut self, c: char) -> Option<Token> {
        match c {
            '\t' | '\n' | ' ' => {
                self.state = State::AttributeNameBefore;
                None
            }
            '/' => {
                self.state = State::SelfClosingStartTag;
                None
            }
            '>' => self.emit_tag(false),
            _ => {
                self.tag_name.push(c.to_ascii_lowercase());
                None
            }
        }
    }

    fn on_self_closing_start_tag(&mut self, c: char) -> Option<Token> {
        match c {
            '>' => self.emit_tag(true),
            _ => {
                self.state = State::AttributeNameBefore;
                self.consume(c)
            }
        }
    }

    fn on_attribute_name_before(&mut self, c: char) -> Option<Token> {
        match c {
            '\t' | '\n' | ' ' => None,
            '/' => {
                self.state = State::SelfClosingStartTag;
                None
            }
            '>' => self.emit_tag(false),
            _ => {
                self.attr_name.clear();
                self.attr_name.push(c.to_ascii_lowercase());
                self.state = State::AttributeName;
                None
            }
        }
    }

    fn on_attribute_name(&mut self, c: char) -> Option<Token> {
        match c {
            '\t' | '\n' | ' ' => {
                self.state = State::AttributeNameAfter;
                None
            }
            '/' => {
                self.push_attribute(String::new());
                self.state = State::SelfClosingStartTag;
                None
            }
            '>' => self.emit_tag(false),
            '=' => {
                self.state = State::AttributeValueBefore;
                None
            }
            _ => {
                self.attr_name.push(c.to_ascii_lowercase());
                None
            }
        }
    }

    fn on_attribute_name_after(&mut self, c: char) -> Option<Token> {
        match c {
            '\t' | '\n' | ' ' => None,
            '/' => {
                self.state = State::SelfClosingStartTag;
                None
            }
            '>' => self.emit_tag(false),
            '=' => {
                self.state = State::AttributeValueBefore;
                None
            }
            _ => {
                // previous name had no value: a boolean attribute
                self.push_attribute(String::new());
                self.attr_name.push(c.to_ascii_lowercase());
                self.state = State::AttributeName;
                None
            }
        }
    }

    fn on_attribute_value_before(&mut self, c: char) -> Option<Token> {
        match c {
            '\t' | '\n' | ' ' => None,
            '"' => {
                self.state = State::AttributeValueDoubleQuote;
                None
            }
            '\'' => {
                self.state = State::AttributeValueSingleQuote;
                None
            }
            '&' => {
                self.state_stack.push(self.state);
                self.state = State::CharacterReference;
                None
            }
            '/' => {
                self.state = State::SelfClosingStartTag;
                None
            }
            '>' => self.emit_tag(false),
            _ => {
                self.text_buf.push(c);
                self.state = State::AttributeValueUnquoted;
                None
            }
        }
    }

    fn on_attribute_value(&mut self, c: char, quote: Option<char>) -> Option<Token> {
        if let Some(quote) = quote {
            if c == '&' {
                self.state_stack.push(self.state);
                self.state = State::CharacterReference;
            } else if c == quote {
                let value = mem::take(&mut self.text_buf);
                self.push_attribute(value);
                self.state = State::AttributeValueAfter;
            } else {
                self.text_buf.push(c);
            }
            None
        } else {
            match c {
                '\t' | '\n' | ' ' => {
                    let value = mem::take(&mut self.text_buf);
                    self.push_attribute(value);
                    self.state = State::AttributeNameBefore;
                    None
                }
                '&' => {
                    self.state_stack.push(self.state);
                    self.state = State::CharacterReference;
                    None
                }
                '>' => {
                    let value = mem::take(&mut self.text_buf);
                    self.push_attribute(value);
                    self.emit_tag(false)
                }
                _ => {
                    self.text_buf.push(c);
                    None
                }
            }
        }
    }

    fn on_attribute_value_after(&mut self, c: char) -> Option<Token> {
        match c {
            '\t' | '\n' | ' ' => {
                self.state = State::AttributeNameBefore;
                None
            }
            '/' => {
                self.state = State::SelfClosingStartTag;
                None
            }
            '>' => self.emit_tag(false),
            _ => {
                self.state = State::AttributeNameBefore;
                self.consume(c)
            }
        }
    }

    fn on_markup_declaration_open(&mut self, c: char) -> Option<Token> {
        match c {
            '-' => {
                if let Some(next) = self.next_scalar() {
                    if next == '-' {
                        self.state = State::CommentStart;
                        return None;
                    }
                    self.state = State::BogusComment;
                    return self.consume(next);
                }
                self.state = State::BogusComment;
                None
            }
            '[' => {
                // lookahead for "CDATA["
                let template = ['C', 'D', 'A', 'T', 'A', '['];
                let mut collected = Vec::new();
                let mut mismatch = false;
                for expected in template {
                    match self.next_scalar() {
                        Some(actual) => {
                            collected.push(actual);
                            if actual != expected {
                                mismatch = true;
                                break;
                            }
                        }
                        None => {
                            mismatch = true;
                            break;
                        }
                    }
                }
                if mismatch {
                    self.state = State::BogusComment;
                    let mut emitted = None;
                    for collected_char in collected {
                        if let Some(token) = self.consume(collected_char) {
                            emitted = Some(token);
                        }
                    }
                    emitted
                } else {
                    self.state = State::Cdata;
                    None
                }
            }
            _ => {
                // anything else, DOCTYPE included, is read as a bogus
                // comment up to the next `>`
                self.state = State::BogusComment;
                self.consume(c)
            }
        }
    }

    fn on_bogus_comment(&mut self, c: char) -> Option<Token> {
        match c {
            '>' => {
                self.state = State::Data;
                Some(Token::Comment(mem::take(&mut self.text_buf)))
            }
            _ => {
                self.text_buf.push(c);
                None
            }
        }
    }

    fn on_comment_start(&mut self, c: char) -> Option<Token> {
        match c {
            '-' => {
                self.state = State::CommentStartDash;
                None
            }
            '>' => {
                self.state = State::Data;
                Some(Token::Comment(mem::take(&mut self.text_buf)))
            }
            _ => {
                self.text_buf.push(c);
                self.state = State::Comment;
                None
            }
        }
    }

    fn on_comment_start_dash(&mut self, c: char) -> Option<Token> {
        match c {
            '-' => {
                self.state = State::CommentEnd;
                None
            }
            '>' => {
                self.state = State::Data;
                Some(Token::Comment(mem::take(&mut self.text_buf)))
            }
            _ => {
                self.text_buf.push('-');
                self.text_buf.push(c);
                self.state = State::Comment;
                None
            }
        }
    }

    fn on_comment(&mut self, c: char) -> Option<Token> {
        match c {
            '-' => self.state = State::CommentEndDash,
            _ => self.text_buf.push(c),
        }
        None
    }

    fn on_comment_end_dash(&mut self, c: char) -> Option<Token> {
        match c {
            '-' => self.state = State::CommentEnd,
            _ => {
                self.text_buf.push('-');
                self.text_buf.push(c);
                self.state = State::Comment;
            }
        }
        None
    }

    fn on_comment_end(&mut self, c: char) -> Option<Token> {
        match c {
            '>' => {
                self.state = State::Data;
                Some(Token::Comment(mem::take(&mut self.text_buf)))
            }
            '!' => {
                self.state = State::CommentEndBang;
                None
            }
            '-' => {
                self.text_buf.push('-');
                None
            }
            _ => {
                self.text_buf.push_str("--");
                self.text_buf.push(c);
                self.state = State::Comment;
                None
            }
        }
    }

    fn on_comment_end_bang(&mut self, c: char) -> Option<Token> {
        match c {
            '-' => {
                self.text_buf.push_str("--!");
                self.state = State::CommentEndDash;
                None
            }
            '>' => {
                self.state = State::Data;
                Some(Token::Comment(mem::take(&mut self.text_buf)))
            }
            _ => {
                self.text_buf.push_str("--!");
                self.text_buf.push(c);
                self.state = State::Comment;
                None
            }
        }
    }

    fn on_cdata(&mut self, c: char) -> Option<Token> {
        match c {
            ']' => self.state = State::CdataEndBracket,
            _ => self.text_buf.push(c),
        }
        None
    }

    fn on_cdata_end_bracket(&mut self, c: char) -> Option<Token> {
        match c {
            ']' => self.state = State::CdataEndTag,
            _ => {
                self.text_buf.push(']');
                self.text_buf.push(c);
                self.state = State::Cdata;
            }
        }
        None
    }

    fn on_cdata_end_tag(&mut self, c: char) -> Option<Token> {
        match c {
            '>' => {
                self.state = State::Data;
                Some(Token::Text(mem::take(&mut self.text_buf)))
            }
            _ => {
                self.text_buf.push_str("]]");
                self.text_buf.push(c);
                self.state = State::Cdata;
                None
            }
        }
    }

    /// Record the pending attribute name with the given value. No-op when
    /// no name is pending; the map is allocated on first use.
    fn push_attribute(&mut self, value: String) {
        if self.attr_name.is_empty() {
            return;
        }
        let name = mem::take(&mut self.attr_name);
        self.attrs
            .get_or_insert_with(AttributeMap::new)
            .insert(name, value);
    }

    /// Finish the current tag. The state pushed when the tag name began
    /// decides whether this is a start or an end tag.
    fn emit_tag(&mut self, self_closing: bool) -> Option<Token> {
        self.push_attribute(String::new());
        self.state = State::Data;

        let opened_from = self.pop_state();
        let name = mem::take(&mut self.tag_name);
        match opened_from {
            State::TagOpen => Some(Token::StartTag {
                name,
                self_closing,
                attributes: self.attrs.take(),
            }),
            State::EndTagOpen => Some(Token::EndTag { name }),
            _ => None,
        }
    }
}

/// Resolve a named character reference from the fixed table; unknown
/// names fall back to `?`.
fn named_char(name: &str) -> char {
    match name {
        "amp" => '&',
        "ouml" => 'ö',
        "Ouml" => 'Ö',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        "auml" => 'ä',
        "Auml" => 'Ä',
        "szlig" => 'ß',
        _ => '?',
    }
}

/// Resolve a numeric character reference; out-of-range or unparsable
/// digits fall back to `?`.
fn numeric_char(digits: &str, radix: u32) -> char {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('?')
}
