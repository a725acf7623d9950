use std::fmt;
use std::rc::Rc;

/// A parsed script: the ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: Rc<str>, value: Expr },
    Assign { name: Rc<str>, value: Expr },
    Return(Expr),
    Load { filename: Expr },
    Read(ReadExpr),
    Save(SaveStmt),
    For(ForExpr),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

/// `save [source] as filename`; the output format is decided at parse time
/// from the filename suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStmt {
    pub source: Option<Rc<str>>,
    pub filename: String,
    pub format: SaveFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Str(String),
    Boolean(bool),
    Ident(Rc<str>),
    Prefix {
        operator: PrefixOp,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: InfixOp,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: BlockStmt,
        alternative: Option<BlockStmt>,
    },
    Function {
        parameters: Vec<Rc<str>>,
        body: Rc<BlockStmt>,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    IndexAssign {
        left: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    Read(ReadExpr),
    For(ForExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Bang,
    Minus,
}

impl PrefixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOp::Bang => "!",
            PrefixOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,
}

impl InfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            InfixOp::Plus => "+",
            InfixOp::Minus => "-",
            InfixOp::Asterisk => "*",
            InfixOp::Slash => "/",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
        }
    }
}

/// `read row (INT|*) [col NAME] [where NAME OP VALUE]`, usable both as a
/// statement and as an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadExpr {
    pub location: LocationExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationExpr {
    pub row: RowSelector,
    /// column name for projection; empty when no `col` clause was given
    pub column: String,
    pub filter: Option<FilterExpr>,
}

/// Row selection of a read: a single index, every row, or the sentinel a
/// malformed clause parses to (the evaluator refuses to run it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelector {
    All,
    Index(i64),
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    pub column: String,
    pub operator: String,
    pub value: Box<Expr>,
}

/// `for INDEX, ELEMENT in ITERABLE { BODY }`, usable both as a statement and
/// as an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub index_name: Rc<str>,
    pub element_name: Rc<str>,
    pub iterable: Box<Expr>,
    pub body: Rc<BlockStmt>,
}

// Display renders every node in concrete syntax that parses back to an
// equivalent tree. Expression statements keep a trailing semicolon so
// adjacent statements cannot merge when reparsed.

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name, value),
            Stmt::Assign { name, value } => write!(f, "{} = {};", name, value),
            Stmt::Return(value) => write!(f, "return {};", value),
            Stmt::Load { filename } => write!(f, "load {};", filename),
            Stmt::Read(read) => write!(f, "{};", read),
            Stmt::Save(save) => write!(f, "{};", save),
            Stmt::For(for_expr) => write!(f, "{}", for_expr),
            Stmt::Expr(expr) => write!(f, "{};", expr),
        }
    }
}

impl fmt::Display for BlockStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for SaveStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "save {} as {}", source, self.filename),
            None => write!(f, "save as {}", self.filename),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(value) => write!(f, "{}", value),
            Expr::Str(value) => write!(f, "\"{}\"", value),
            Expr::Boolean(value) => write!(f, "{}", value),
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Prefix { operator, right } => write!(f, "({}{})", operator.symbol(), right),
            Expr::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({}) {{ {} }}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {{ {} }}", alternative)?;
                }
                Ok(())
            }
            Expr::Function { parameters, body } => {
                let params: Vec<&str> = parameters.iter().map(|p| p.as_ref()).collect();
                write!(f, "fn({}) {{ {} }}", params.join(", "), body)
            }
            Expr::Call {
                function,
                arguments,
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expr::Array(elements) => {
                let elems: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", elems.join(", "))
            }
            Expr::Index { left, index } => write!(f, "({}[{}])", left, index),
            Expr::IndexAssign { left, index, value } => {
                write!(f, "({}[{}]) = {}", left, index, value)
            }
            Expr::Read(read) => write!(f, "{}", read),
            Expr::For(for_expr) => write!(f, "{}", for_expr),
        }
    }
}

impl fmt::Display for ReadExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read {}", self.location)
    }
}

impl fmt::Display for LocationExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            RowSelector::All => write!(f, "row *")?,
            RowSelector::Index(index) => write!(f, "row {}", index)?,
            RowSelector::Invalid => write!(f, "row ?")?,
        }
        if !self.column.is_empty() {
            write!(f, " col {}", self.column)?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " {}", filter)?;
        }
        Ok(())
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "where {} {} {}", self.column, self.operator, self.value)
    }
}

impl fmt::Display for ForExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "for {}, {} in {} {{ {} }}",
            self.index_name, self.element_name, self.iterable, self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_display() {
        let program = Program {
            statements: vec![Stmt::Let {
                name: Rc::from("myVar"),
                value: Expr::Ident(Rc::from("anotherVar")),
            }],
        };
        assert_eq!(program.to_string(), "let myVar = anotherVar;");
    }

    #[test]
    fn test_read_display() {
        let read = ReadExpr {
            location: LocationExpr {
                row: RowSelector::Index(0),
                column: "name".to_string(),
                filter: Some(FilterExpr {
                    column: "age".to_string(),
                    operator: ">".to_string(),
                    value: Box::new(Expr::Integer(12)),
                }),
            },
        };
        assert_eq!(read.to_string(), "read row 0 col name where age > 12");
    }

    #[test]
    fn test_string_literal_display_is_quoted() {
        let stmt = Stmt::Let {
            name: Rc::from("s"),
            value: Expr::Str("abc".to_string()),
        };
        assert_eq!(stmt.to_string(), "let s = \"abc\";");
    }
}
