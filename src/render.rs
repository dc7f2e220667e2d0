use itertools::Itertools;

use crate::types::*;

// --------------------------------------------------------------------------------------------------------------------
// Public functions
// --------------------------------------------------------------------------------------------------------------------

/// Generate the binding module, the query-builder types are imported from `prelude`
pub fn run(model: &Model, prelude: &str) -> codegen::Scope {
    let mut scope = codegen::Scope::new();

    // Exported names mirror the catalog, not Rust conventions
    scope.raw("#![allow(non_camel_case_types, non_snake_case)]");
    scope.raw(&format!("use {}::*;", prelude));

    for table in &model.tables {
        gen_table(&mut scope, table);
    }
    for function in &model.functions {
        gen_function(&mut scope, function);
    }

    scope
}

// --------------------------------------------------------------------------------------------------------------------
// Private functions
// --------------------------------------------------------------------------------------------------------------------

fn gen_table(scope: &mut codegen::Scope, table: &Table) {
    let kind = if table.is_view { "View" } else { "Table" };
    gen_struct(
        scope,
        &table.struct_name,
        &format!("{} `{}.{}`.", kind, table.schema, table.name),
        ("table", "Table"),
        &table.fields,
    );

    // Constructor
    let ctor = scope.new_fn(&table.constructor);
    ctor.vis("pub");
    ctor.ret(table.struct_name.as_str());
    ctor.line(format!("{}::new(\"\")", table.struct_name));

    // Linkage and alias
    let imp = scope.new_impl(&table.struct_name);
    let new_fn = imp.new_fn("new");
    new_fn.arg("alias", "&str");
    new_fn.ret("Self");
    new_fn.line(format!(
        "let table = Table::new({:?}, {:?}, alias);",
        table.schema, table.name
    ));
    new_fn.push_block(gen_fields_block("table", &table.fields));

    let alias_fn = imp.new_fn("alias");
    alias_fn.vis("pub");
    alias_fn.arg_ref_self();
    alias_fn.arg("alias", "&str");
    alias_fn.ret("Self");
    alias_fn.line("Self::new(alias)");
}

fn gen_function(scope: &mut codegen::Scope, function: &Function) {
    gen_struct(
        scope,
        &function.struct_name,
        &format!("Function `{}.{}({})`.", function.schema, function.name, function.signature),
        ("function", "Function"),
        &function.results,
    );

    // Constructor, one typed argument per function argument
    let ctor = scope.new_fn(&function.constructor);
    ctor.vis("pub");
    for arg in &function.arguments {
        ctor.arg(&arg.ident, arg.rs_type.as_str());
    }
    ctor.ret(function.struct_name.as_str());
    let args = function
        .arguments
        .iter()
        .map(|arg| format!("Argument::new({})", arg.ident))
        .join(", ");
    ctor.line(format!("{}::new(vec![{}], \"\")", function.struct_name, args));

    // Linkage and alias
    let imp = scope.new_impl(&function.struct_name);
    let new_fn = imp.new_fn("new");
    new_fn.arg("args", "Vec<Argument>");
    new_fn.arg("alias", "&str");
    new_fn.ret("Self");
    new_fn.line(format!(
        "let function = Function::new({:?}, {:?}, args, alias);",
        function.schema, function.name
    ));
    new_fn.push_block(gen_fields_block("function", &function.results));

    let alias_fn = imp.new_fn("alias");
    alias_fn.vis("pub");
    alias_fn.arg_ref_self();
    alias_fn.arg("alias", "&str");
    alias_fn.ret("Self");
    alias_fn.line("Self::new(self.function.args().to_vec(), alias)");
}

/// Struct holding the catalog linkage plus one member per field
fn gen_struct(scope: &mut codegen::Scope, name: &str, doc: &str, linkage: (&str, &str), fields: &[Field]) {
    let new_struct = scope.new_struct(name);
    new_struct.doc(doc);
    new_struct.vis("pub");
    new_struct.derive("Debug");
    new_struct.derive("Clone");

    new_struct.field(&format!("pub {}", linkage.0), linkage.1);
    for field in fields {
        new_struct.field(&format!("pub {}", field.ident), field.constructor.as_str());
    }
}

/// `Self { FIELD: Kind::new(&owner, "field"), ..., owner, }`
fn gen_fields_block(owner: &str, fields: &[Field]) -> codegen::Block {
    let mut block = codegen::Block::new("Self");
    for field in fields {
        block.line(format!(
            "{}: {}::new(&{}, {:?}),",
            field.ident, field.constructor, owner, field.name
        ));
    }
    block.line(format!("{},", owner));
    block
}
