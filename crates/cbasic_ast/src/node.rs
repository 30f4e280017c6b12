//! AST node definitions.
//!
//! Expressions and statements are closed sum types. Every composite node
//! owns its children by value (`Box`/`Vec`), so a `Program` owns the entire
//! tree and can be handed to an evaluator by move.

use serde::Serialize;
use std::fmt;

/// A parsed program: the ordered top-level statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "NOT",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Or,
    Xor,
    And,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    IntDiv,
    Pow,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
            BinaryOp::And => "AND",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "MOD",
            BinaryOp::IntDiv => "\\",
            BinaryOp::Pow => "^",
        }
    }

    /// Whether this operator compares its operands (usable after `CASE IS`).
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A literal value. Numbers keep their source text; conversion belongs to
/// the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Number(String),
    String(String),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedArg {
    pub name: String,
    pub value: Expr,
}

/// Arguments at a call site.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallArgs {
    pub positional: Vec<Expr>,
    pub named: Vec<NamedArg>,
}

impl CallArgs {
    pub fn positional(args: Vec<Expr>) -> Self {
        Self {
            positional: args,
            named: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

/// One piece of an f-string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InterpolationPart {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCase {
    pub pattern: Expr,
    pub result: Expr,
}

/// The accessor after `?.` or `?[`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NullSafeAccess {
    Member(String),
    Index(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: String,
        args: CallArgs,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    MemberAccess {
        object: Box<Expr>,
        member: String,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: CallArgs,
    },
    ArrayLiteral(Vec<Expr>),
    MapLiteral(Vec<MapEntry>),
    InterpolatedString(Vec<InterpolationPart>),
    TupleLiteral(Vec<Expr>),
    RangeLiteral {
        start: Box<Expr>,
        end: Box<Expr>,
    },
    Lambda {
        params: Vec<Param>,
        return_type: Option<String>,
        body: Vec<Stmt>,
    },
    Match {
        value: Box<Expr>,
        cases: Vec<MatchCase>,
        default: Option<Box<Expr>>,
    },
    TypeOf(Box<Expr>),
    GetProperties(Box<Expr>),
    GetMethods(Box<Expr>),
    NullSafe {
        object: Box<Expr>,
        access: NullSafeAccess,
    },
    NullCoalesce {
        value: Box<Expr>,
        fallback: Box<Expr>,
    },
    Spread(Box<Expr>),
    SuperCall {
        method: String,
        args: CallArgs,
    },
    ArrayComprehension {
        element: Box<Expr>,
        var: String,
        collection: Box<Expr>,
        condition: Option<Box<Expr>>,
    },
}

impl Expr {
    pub fn number(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::Number(text.into()))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(text.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.into(),
            args: CallArgs::positional(args),
        }
    }

    pub fn index(target: Expr, index: Expr) -> Self {
        Expr::Index {
            target: Box::new(target),
            index: Box::new(index),
        }
    }

    /// The placeholder substituted for an expression that failed to parse.
    pub fn placeholder() -> Self {
        Expr::number("0")
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A declared parameter: `name [AS Type] [= default]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub type_name: Option<String>,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// A single test in a `CASE` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CaseTest {
    Value(Expr),
    /// `IS <op> expr`
    Is { op: BinaryOp, value: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CaseLabel {
    Tests(Vec<CaseTest>),
    Else,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseBranch {
    pub label: CaseLabel,
    pub body: Vec<Stmt>,
}

/// The construct named after `EXIT` or `CONTINUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    For,
    While,
    Do,
    Sub,
    Function,
}

impl BlockKind {
    pub fn is_loop(self) -> bool {
        matches!(self, BlockKind::For | BlockKind::While | BlockKind::Do)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub var: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: Option<String>,
}

/// A user-defined type with optional single parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub parent: Option<String>,
    pub fields: Vec<FieldDecl>,
    /// `Stmt::Sub` and `Stmt::Function` declarations.
    pub methods: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionDecl {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDecl {
    pub name: String,
    pub public: bool,
    pub body: Vec<Stmt>,
}

/// An operator overload: `OPERATOR + FOR Vec2 (a, b) ... END OPERATOR`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorDecl {
    pub op: BinaryOp,
    pub type_name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HookKind {
    Enter,
    Exit,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateHook {
    pub kind: HookKind,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub condition: Option<Expr>,
    pub priority: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDecl {
    pub name: String,
    pub animation: Option<String>,
    pub blend: Option<Expr>,
    pub wait: Option<Expr>,
    pub body: Vec<Stmt>,
    pub hooks: Vec<StateHook>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateGroup {
    pub name: String,
    pub states: Vec<StateDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateSystemDecl {
    pub name: String,
    pub states: Vec<StateDecl>,
    pub groups: Vec<StateGroup>,
    /// Each inner list is one `PARALLEL` block.
    pub parallel: Vec<Vec<StateDecl>>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    OptionExplicit,
    Let {
        name: String,
        type_name: Option<String>,
        value: Expr,
    },
    Const {
        name: String,
        value: Expr,
    },
    Assign {
        name: String,
        value: Expr,
    },
    AssignIndex {
        name: String,
        indices: Vec<Expr>,
        value: Expr,
    },
    AssignMember {
        object: Expr,
        member: String,
        value: Expr,
    },
    DestructureAssign {
        names: Vec<String>,
        value: Expr,
    },
    Local(Vec<String>),
    Global(Vec<String>),
    Print(Vec<Expr>),
    PrintC(Vec<Expr>),
    Expr(Expr),
    Call {
        name: String,
        args: CallArgs,
    },
    Break,
    Continue(Option<BlockKind>),
    Exit(BlockKind),
    Goto(String),
    Gosub(String),
    Label(String),
    End,
    Import(String),
    If {
        branches: Vec<IfBranch>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    DoLoop {
        body: Vec<Stmt>,
    },
    RepeatUntil {
        body: Vec<Stmt>,
        condition: Expr,
    },
    ForNext {
        var: String,
        start: Expr,
        limit: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    ForEach {
        var: String,
        collection: Expr,
        body: Vec<Stmt>,
    },
    Sub(SubDecl),
    Function(FunctionDecl),
    Return(Option<Expr>),
    Dim {
        name: String,
        sizes: Vec<Expr>,
        type_name: Option<String>,
    },
    Redim {
        name: String,
        sizes: Vec<Expr>,
        preserve: bool,
    },
    SelectCase {
        selector: Expr,
        branches: Vec<CaseBranch>,
    },
    TryCatch {
        body: Vec<Stmt>,
        catch: Option<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Throw(Expr),
    Type(TypeDecl),
    Enum(EnumDecl),
    Union(UnionDecl),
    Module(ModuleDecl),
    Operator(OperatorDecl),
    Using {
        name: String,
        value: Expr,
        body: Vec<Stmt>,
    },
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
    Breakpoint,
    DebugPrint(Expr),
    Yield(Option<Expr>),
    Await(Expr),
    EventDecl(String),
    EventHandler {
        event: String,
        name: String,
        body: Vec<Stmt>,
    },
    State(StateDecl),
    StateHook(StateHook),
    Transition(Transition),
    StateGroup(StateGroup),
    Parallel(Vec<StateDecl>),
    StateSystem(StateSystemDecl),
    AttachSystem {
        system: String,
        target: Expr,
    },
    AddState {
        state: String,
        system: String,
    },
    RemoveState {
        state: String,
        system: String,
    },
    EnableState {
        state: String,
        enabled: bool,
    },
    DebugStates(Option<String>),
    OverrideState {
        state: String,
        body: Vec<Stmt>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_constructor() {
        let e = Expr::binary(BinaryOp::Add, Expr::number("1"), Expr::var("X"));
        match e {
            Expr::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::Add);
                assert_eq!(*left, Expr::number("1"));
                assert_eq!(*right, Expr::Variable("X".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_relational_ops() {
        assert!(BinaryOp::Lte.is_relational());
        assert!(!BinaryOp::Add.is_relational());
        assert_eq!(BinaryOp::IntDiv.to_string(), "\\");
        assert_eq!(UnaryOp::Not.to_string(), "NOT");
    }

    #[test]
    fn test_call_args_len() {
        let mut args = CallArgs::positional(vec![Expr::number("1")]);
        args.named.push(NamedArg {
            name: "SPEED".into(),
            value: Expr::number("2"),
        });
        assert_eq!(args.len(), 2);
        assert!(!args.is_empty());
        assert!(CallArgs::default().is_empty());
    }

    #[test]
    fn test_serialize_statement() {
        let stmt = Stmt::Assign {
            name: "X".into(),
            value: Expr::number("1"),
        };
        let json = serde_json::to_string(&stmt).unwrap();
        assert_eq!(json, r#"{"Assign":{"name":"X","value":{"Literal":{"Number":"1"}}}}"#);
    }

    #[test]
    fn test_block_kind_loops() {
        assert!(BlockKind::Do.is_loop());
        assert!(!BlockKind::Sub.is_loop());
    }
}
