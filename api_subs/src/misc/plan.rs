use common::plan::Plan;

/// Guesses the purchased plan from a Stripe product name.
///
/// Case-insensitive substring match, most generous tier first so that a
/// name like "Pro Illimité" resolves to illimite.
pub fn infer_plan_from_product_name(name: &str) -> Option<Plan> {
    let name = name.to_lowercase();
    if name.contains("illim") {
        Some(Plan::Illimite)
    } else if name.contains("pro") {
        Some(Plan::Pro)
    } else if name.contains("basic") || name.contains("basique") {
        Some(Plan::Basic)
    } else {
        None
    }
}

/// First plan that any of `names` maps to.
pub fn infer_plan<'a, I>(names: I) -> Option<Plan>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().find_map(infer_plan_from_product_name)
}
