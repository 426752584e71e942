//! # Helper Library
//!
//! The small runtime the generated code calls into. Emitters record which
//! helpers they reference; the assembler imports (or inlines) only those.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Helper {
    Log,
    Delay,
    Add,
    Subtract,
    Multiply,
    Divide,
    LogicAnd,
    LogicOr,
    LogicNot,
    Equal,
    Greater,
    Less,
    ToString,
    ToNumber,
    ToBoolean,
}

impl Helper {
    pub const ALL: [Helper; 15] = [
        Helper::Log,
        Helper::Delay,
        Helper::Add,
        Helper::Subtract,
        Helper::Multiply,
        Helper::Divide,
        Helper::LogicAnd,
        Helper::LogicOr,
        Helper::LogicNot,
        Helper::Equal,
        Helper::Greater,
        Helper::Less,
        Helper::ToString,
        Helper::ToNumber,
        Helper::ToBoolean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Helper::Log => "log",
            Helper::Delay => "delay",
            Helper::Add => "add",
            Helper::Subtract => "subtract",
            Helper::Multiply => "multiply",
            Helper::Divide => "divide",
            Helper::LogicAnd => "logicAnd",
            Helper::LogicOr => "logicOr",
            Helper::LogicNot => "logicNot",
            Helper::Equal => "equal",
            Helper::Greater => "greater",
            Helper::Less => "less",
            Helper::ToString => "toString",
            Helper::ToNumber => "toNumber",
            Helper::ToBoolean => "toBoolean",
        }
    }

    /// The declaration, without `export`.
    pub fn declaration(self) -> &'static str {
        match self {
            Helper::Log => "function log(...values: any[]): void {\n    console.log(...values);\n}",
            Helper::Delay => {
                "function delay(ms: number): Promise<void> {\n    return new Promise(resolve => setTimeout(resolve, ms));\n}"
            }
            Helper::Add => "function add(a: number, b: number): number {\n    return a + b;\n}",
            Helper::Subtract => "function subtract(a: number, b: number): number {\n    return a - b;\n}",
            Helper::Multiply => "function multiply(a: number, b: number): number {\n    return a * b;\n}",
            Helper::Divide => "function divide(a: number, b: number): number {\n    return a / b;\n}",
            Helper::LogicAnd => "function logicAnd(a: boolean, b: boolean): boolean {\n    return a && b;\n}",
            Helper::LogicOr => "function logicOr(a: boolean, b: boolean): boolean {\n    return a || b;\n}",
            Helper::LogicNot => "function logicNot(value: boolean): boolean {\n    return !value;\n}",
            Helper::Equal => "function equal(a: any, b: any): boolean {\n    return a === b;\n}",
            Helper::Greater => "function greater(a: number, b: number): boolean {\n    return a > b;\n}",
            Helper::Less => "function less(a: number, b: number): boolean {\n    return a < b;\n}",
            Helper::ToString => "function toString(value: any): string {\n    return String(value);\n}",
            Helper::ToNumber => "function toNumber(value: any): number {\n    return Number(value);\n}",
            Helper::ToBoolean => "function toBoolean(value: any): boolean {\n    return Boolean(value);\n}",
        }
    }
}

/// The shared helper module, every helper exported.
pub fn generate_helper_library() -> String {
    let mut code = String::new();
    code.push_str("/**\n");
    code.push_str(" * Blueprint runtime helpers\n");
    code.push_str(" * Auto-generated - do not modify manually\n");
    code.push_str(" */\n");
    for helper in Helper::ALL {
        code.push('\n');
        code.push_str("export ");
        code.push_str(helper.declaration());
        code.push('\n');
    }
    code
}

/// `import { a, b } from 'module';`, or `None` when nothing is used.
pub fn import_statement(used: &BTreeSet<Helper>, module: &str) -> Option<String> {
    if used.is_empty() {
        return None;
    }
    let names: Vec<&str> = used.iter().map(|h| h.name()).collect();
    Some(format!("import {{ {} }} from '{}';", names.join(", "), module))
}

/// Unexported declarations of the used helpers, for self-contained units.
pub fn inline_declarations(used: &BTreeSet<Helper>) -> Vec<&'static str> {
    used.iter().map(|h| h.declaration()).collect()
}
