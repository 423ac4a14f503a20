use yew::prelude::*;

use crate::components::SceneCanvas;
use crate::scene::SceneConfig;

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| SceneConfig::default());

    html! {
        <main class="home">
            <SceneCanvas config={(*config).clone()} />
        </main>
    }
}
