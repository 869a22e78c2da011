/// Runs `f` with the given environment variables set, restoring the
/// previous values afterwards. Callers must be `#[serial]`.
pub fn with_env<F>(vars: &[(&str, Option<&str>)], f: F)
where
    F: FnOnce(),
{
    let saved: Vec<_> = vars
        .iter()
        .map(|(key, _)| (*key, std::env::var_os(key)))
        .collect();

    for (key, value) in vars {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    f();

    for (key, old) in saved {
        match old {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
}
