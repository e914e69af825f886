/// Lexical tokens of the RQL wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A run of non-structural characters, still percent-encoded
    ///
    /// # Examples
    /// ```text
    /// eq
    /// string:123
    /// 2024-01-01T00%3A00%3A00.000Z
    /// ```
    Text(String),

    /// Opens an argument list or an array
    LParen,

    /// Closes an argument list or an array
    RParen,

    /// Separates arguments
    Comma,

    /// Joins top-level conjuncts
    ///
    /// # Examples
    /// ```text
    /// eq(a,1)&gt(b,2)
    /// ```
    Ampersand,

    /// FIQL shorthand separator
    ///
    /// # Examples
    /// ```text
    /// name=pump
    /// age=gt=3
    /// ```
    Equals,

    /// End of input
    Eof,
}
