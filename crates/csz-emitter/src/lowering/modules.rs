//! `import` and `export` declarations.
//!
//! Module declarations are only valid at the top level of the program. A
//! program containing one is emitted without the top-level function
//! wrapper.

use super::Compiler;
use crate::ir::{JsImportSpecifier, JsKind, JsNode};
use crate::scope::VarKind;
use csz_ast::{AssignContext, ExportKind, NodeAccess, NodeIndex, NodeKind};
use csz_common::CompileResult;
use csz_common::diagnostics::messages;

impl Compiler<'_> {
    fn check_module_position(&mut self, idx: NodeIndex, keyword: &str) -> CompileResult<()> {
        if self.fns.len() != 1 || self.ctx().nesting != 0 {
            return Err(self.error(messages::MODULE_NOT_TOP_LEVEL, &[keyword], idx));
        }
        self.has_modules = true;
        Ok(())
    }

    fn module_source(&self, source: NodeIndex) -> CompileResult<String> {
        match self.tree.kind(source) {
            Some(NodeKind::StringLiteral { value }) => Ok(value.clone()),
            _ => Err(self.error(messages::UNEXPECTED_NODE, &["module source"], source)),
        }
    }

    fn binding_name(&self, idx: NodeIndex) -> CompileResult<String> {
        self.tree
            .identifier_text(self.unwrap(idx))
            .map(str::to_string)
            .ok_or_else(|| self.error(messages::UNEXPECTED_NODE, &["module binding"], idx))
    }

    /// Bind an imported name in the root scope, once.
    fn declare_import(&mut self, at: NodeIndex, name: &str) -> CompileResult<()> {
        let scope = self.scope();
        if matches!(self.scopes.kind_of(scope, name), Some(VarKind::Import)) {
            return Err(self.error(messages::IMPORT_REDECLARED, &[name], at));
        }
        self.scopes.add(scope, name, VarKind::Import, true);
        Ok(())
    }

    fn specifier(&self, idx: NodeIndex) -> CompileResult<JsImportSpecifier> {
        let Some(NodeKind::ModuleSpecifier { original, alias }) = self.tree.kind(idx) else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["module specifier"], idx));
        };
        let imported = self.binding_name(*original)?;
        let local = match alias {
            Some(alias) => self.binding_name(*alias)?,
            None => imported.clone(),
        };
        Ok(JsImportSpecifier { imported, local })
    }

    pub(crate) fn lower_import(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::ImportDeclaration {
            default_binding,
            namespace,
            specifiers,
            source,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["import"], idx));
        };
        self.check_module_position(idx, "import")?;
        let source = self.module_source(source)?;

        let default = match default_binding {
            Some(binding) => {
                let name = self.binding_name(binding)?;
                self.declare_import(binding, &name)?;
                Some(name)
            }
            None => None,
        };
        let namespace = match namespace {
            Some(binding) => {
                let name = self.binding_name(binding)?;
                self.declare_import(binding, &name)?;
                Some(name)
            }
            None => None,
        };
        let specifiers = match specifiers {
            Some(list) => {
                let mut out = Vec::with_capacity(list.len());
                for item in list {
                    let specifier = self.specifier(item)?;
                    self.declare_import(item, &specifier.local)?;
                    out.push(specifier);
                }
                Some(out)
            }
            None => None,
        };
        Ok(JsNode::new(JsKind::Import {
            default,
            namespace,
            specifiers,
            source,
        }))
    }

    pub(crate) fn lower_export(&mut self, idx: NodeIndex) -> CompileResult<JsNode> {
        let NodeKind::Export {
            kind,
            specifiers,
            declaration,
            source,
        } = self.kind(idx)?
        else {
            return Err(self.error(messages::UNEXPECTED_NODE, &["export"], idx));
        };
        self.check_module_position(idx, "export")?;
        let source = match source {
            Some(source) => Some(self.module_source(source)?),
            None => None,
        };
        match kind {
            ExportKind::Named => {
                let specifiers = specifiers
                    .iter()
                    .map(|&item| self.specifier(item))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(JsNode::new(JsKind::ExportNamed { specifiers, source }))
            }
            ExportKind::All => {
                let Some(source) = source else {
                    return Err(self.error(messages::UNEXPECTED_NODE, &["export *"], idx));
                };
                Ok(JsNode::new(JsKind::ExportAll { source }))
            }
            ExportKind::Default => {
                let Some(declaration) = declaration else {
                    return Err(self.error(messages::UNEXPECTED_NODE, &["export default"], idx));
                };
                let value = self.lower_expr(declaration)?;
                Ok(JsNode::new(JsKind::ExportDefault(Box::new(value))))
            }
            ExportKind::Declaration => {
                let Some(declaration) = declaration else {
                    return Err(self.error(messages::UNEXPECTED_NODE, &["export"], idx));
                };
                let lowered = self.lower_export_declaration(declaration)?;
                Ok(JsNode::new(JsKind::ExportDeclaration(Box::new(lowered))))
            }
        }
    }

    /// `export a = 1` and `export class A`.
    fn lower_export_declaration(&mut self, declaration: NodeIndex) -> CompileResult<JsNode> {
        let target = self.unwrap(declaration);
        match self.kind(target)? {
            NodeKind::Class { variable: None, .. } => {
                Err(self.error(messages::ANONYMOUS_CLASS_EXPORT, &[], target))
            }
            NodeKind::Class { .. } => {
                let comments = self.take_comments(declaration);
                let lowered = self.lower_class_declaration(target)?;
                let lowered = self.exported_binding(lowered);
                Ok(lowered.located(self.loc(target)).with_comments(comments))
            }
            NodeKind::Assign {
                variable,
                value,
                context: AssignContext::Plain,
            } => {
                let Some(name) = self.identifier_name(variable) else {
                    let text = self.provisional_text(variable);
                    return Err(self.error(messages::CANT_BE_ASSIGNED, &[&text], variable));
                };
                self.check_assignable(variable)?;
                let scope = self.scope();
                if matches!(self.scopes.kind_of(scope, &name), Some(VarKind::Import)) {
                    return Err(self.error(messages::IMPORT_READ_ONLY, &[&name], variable));
                }
                self.scopes.add(scope, &name, VarKind::Export, true);
                let value = self.lower_assigned_value(value, Some(name.clone()))?;
                Ok(JsNode::at(JsKind::VarDecl(vec![(name, Some(value))]), self.loc(target)))
            }
            other => Err(self.error(messages::UNEXPECTED_NODE, &[other.name()], target)),
        }
    }

    /// Turn `A = value` into `var A = value`, declared by the export itself.
    fn exported_binding(&mut self, lowered: JsNode) -> JsNode {
        let name = match &lowered.kind {
            JsKind::Assign {
                operator, target, ..
            } if operator == "=" => target.as_identifier().map(str::to_string),
            _ => None,
        };
        let Some(name) = name else {
            return lowered;
        };
        match lowered.kind {
            JsKind::Assign { value, .. } => {
                let scope = self.scope();
                self.scopes.add(scope, &name, VarKind::Export, true);
                JsNode::at(JsKind::VarDecl(vec![(name, Some(*value))]), lowered.loc)
            }
            kind => JsNode {
                kind,
                loc: lowered.loc,
                comments: lowered.comments,
            },
        }
    }
}
