use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct ModalProps {
    #[prop_or_default]
    pub children: Html,
}

/// Helper component to mount the win dialog under document.body rather than inside the board.
#[function_component]
pub(crate) fn Modal(props: &ModalProps) -> Html {
    let modal_host = gloo::utils::body();
    create_portal(props.children.clone(), modal_host.into())
}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    let mut bytes = [0u8; 8];
    for byte in &mut bytes {
        *byte = (256. * random()) as u8;
    }
    u64::from_be_bytes(bytes)
}

pub(crate) fn format_secs(secs: u32) -> String {
    format!("{}s", secs)
}
