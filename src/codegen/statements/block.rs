use crate::ast::Block;
use crate::codegen::context::GeneratorContext;
use crate::codegen::error::CodegenError;

/// Emits every statement in `block`. Locals declared directly in the block
/// go out of scope when it ends; `defer`/`errdefer` are
/// function-scoped (SPEC decision, see DESIGN.md) so they are deliberately
/// not unwound here.
pub fn emit_block(ctx: &mut GeneratorContext<'_>, block: &Block) -> Result<(), CodegenError> {
    let saved_len = ctx.local_variables.len();
    for stmt in &block.statements {
        super::emit_stmt(ctx, stmt)?;
    }
    ctx.local_variables.truncate(saved_len);
    Ok(())
}
