//! Built-in helpers registered on every adapter

use handlebars::{
    Context, Handlebars, Helper, HelperResult, JsonRender, Output, RenderContext, RenderError,
    RenderErrorReason,
};

/// Names of the helpers registered by [`register_builtin_helpers`]
pub const BUILTIN_HELPERS: [&str; 5] = ["concat", "eq", "upper", "lower", "default"];

/// Register the built-in helpers
pub fn register_builtin_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("concat", Box::new(concat_helper));
    handlebars.register_helper("eq", Box::new(eq_helper));
    handlebars.register_helper("upper", Box::new(upper_helper));
    handlebars.register_helper("lower", Box::new(lower_helper));
    handlebars.register_helper("default", Box::new(default_helper));
}

fn missing_param(helper: &'static str, index: usize) -> RenderError {
    RenderErrorReason::ParamNotFoundForIndex(helper, index).into()
}

/// Join all parameters into one string: {{concat "Hi " name "!"}}
fn concat_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let joined: String = h.params().iter().map(|p| p.value().render()).collect();
    out.write(&joined)?;
    Ok(())
}

/// Equality helper: {{#if (eq status "paid")}}
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let left = h.param(0).ok_or_else(|| missing_param("eq", 0))?;
    let right = h.param(1).ok_or_else(|| missing_param("eq", 1))?;

    if left.value() == right.value() {
        out.write("true")?;
    }
    Ok(())
}

fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).ok_or_else(|| missing_param("upper", 0))?;
    out.write(&param.value().render().to_uppercase())?;
    Ok(())
}

fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).ok_or_else(|| missing_param("lower", 0))?;
    out.write(&param.value().render().to_lowercase())?;
    Ok(())
}

/// Fallback for null or missing values: {{default nickname "friend"}}
fn default_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let fallback = h.param(1).ok_or_else(|| missing_param("default", 1))?;

    let value = match h.param(0) {
        Some(param) if !param.value().is_null() => param.value(),
        _ => fallback.value(),
    };

    out.write(&value.render())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        register_builtin_helpers(&mut handlebars);
        handlebars
    }

    #[test]
    fn test_concat_helper() {
        let result = registry()
            .render_template(r#"{{concat "Hello, " name "!"}}"#, &json!({"name": "Ada"}))
            .unwrap();
        assert_eq!(result, "Hello, Ada!");
    }

    #[test]
    fn test_eq_helper() {
        let template = r#"{{#if (eq status "paid")}}paid{{else}}due{{/if}}"#;

        let result = registry()
            .render_template(template, &json!({"status": "paid"}))
            .unwrap();
        assert_eq!(result, "paid");

        let result = registry()
            .render_template(template, &json!({"status": "open"}))
            .unwrap();
        assert_eq!(result, "due");
    }

    #[test]
    fn test_case_helpers() {
        let result = registry()
            .render_template("{{upper a}} {{lower b}}", &json!({"a": "shout", "b": "QUIET"}))
            .unwrap();
        assert_eq!(result, "SHOUT quiet");
    }

    #[test]
    fn test_default_helper() {
        let result = registry()
            .render_template(r#"Hi {{default nickname "friend"}}"#, &json!({}))
            .unwrap();
        assert_eq!(result, "Hi friend");

        let result = registry()
            .render_template(r#"Hi {{default nickname "friend"}}"#, &json!({"nickname": "Ada"}))
            .unwrap();
        assert_eq!(result, "Hi Ada");
    }

    #[test]
    fn test_builtin_names_are_registered() {
        let handlebars = registry();
        let context = json!({"a": "x"});

        for name in BUILTIN_HELPERS {
            // an unknown helper would fail with "Helper not defined"
            let template = format!("{{{{{} a a}}}}", name);
            assert!(handlebars.render_template(&template, &context).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_eq_requires_two_params() {
        let result = registry().render_template(r#"{{eq a}}"#, &json!({"a": 1}));
        assert!(result.is_err());
    }
}
