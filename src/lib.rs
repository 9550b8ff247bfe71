//! Plugin host for the myrecipes application.
//!
//! Every stateful feature of the app (the meal plan, for instance) is a
//! [`Plugin`]. Plugins are installed once into a [`PluginManager`] that the
//! iced application owns; the manager keeps each plugin's state, routes
//! messages to it and fans its outputs out to listeners. A [`PluginHandle`]
//! is the typed key used to reach an installed plugin again.

use iced::futures::channel::mpsc;
use iced::{Subscription, Task};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A self-contained unit of application state and behaviour.
pub trait Plugin: Send + Sync {
    /// Public commands accepted from application code
    type Input: Clone + Send + Sync + 'static;

    /// Everything the plugin's `update` understands, including the results
    /// of its own background tasks
    type Message: Clone + Send + Sync + From<Self::Input> + 'static;

    /// State owned by the manager on the plugin's behalf
    type State: Send + 'static;

    /// Events other parts of the application may listen to
    type Output: Clone + Send + Sync + 'static;

    /// Stable name used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Build the initial state. The returned task is started together with
    /// the application and is where plugins kick off their loading work.
    fn init(&self) -> (Self::State, Task<Self::Message>);

    /// Apply a message to the state.
    ///
    /// Must not block: anything slow goes into the returned task.
    fn update(
        &self,
        state: &mut Self::State,
        message: Self::Message,
    ) -> (Task<Self::Message>, Option<Self::Output>);

    /// External event sources, possibly depending on the current state
    fn subscription(&self, state: &Self::State) -> Subscription<Self::Message>;
}

type OutputRegistry = Arc<Mutex<HashMap<usize, Vec<mpsc::UnboundedSender<PluginOutput>>>>>;

fn output_listener<O: Clone + Send + Sync + 'static>(
    plugin_index: usize,
    output_type_id: TypeId,
    registry: OutputRegistry,
) -> impl iced::futures::Stream<Item = O> {
    use iced::futures::{SinkExt, StreamExt};

    iced::stream::channel(100, move |mut output_sender: mpsc::Sender<O>| async move {
        let (sender, mut receiver) = mpsc::unbounded();

        if let Ok(mut reg) = registry.lock() {
            reg.entry(plugin_index).or_default().push(sender);
        }

        while let Some(output) = receiver.next().await {
            if plugin_index != output.plugin_index() || output_type_id != output.type_id {
                continue;
            }
            if let Some(typed_output) = output.downcast::<O>()
                && output_sender.send(typed_output.clone()).await.is_err()
            {
                break;
            }
        }

        // Dropping the receiver disconnects the sender; the manager prunes it
        // on the next output it tries to deliver.
    })
}

/// Typed reference to an installed plugin
#[derive(Debug)]
pub struct PluginHandle<P: Plugin> {
    plugin_index: usize,
    output_registry: OutputRegistry,
    _phantom: std::marker::PhantomData<P>,
}

impl<P: Plugin> Clone for PluginHandle<P> {
    fn clone(&self) -> Self {
        Self::new(self.plugin_index, Arc::clone(&self.output_registry))
    }
}

impl<P: Plugin> PluginHandle<P> {
    fn new(plugin_index: usize, output_registry: OutputRegistry) -> Self {
        Self {
            plugin_index,
            output_registry,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Position of the plugin inside its manager
    pub fn index(&self) -> usize {
        self.plugin_index
    }

    /// Queue an input for the plugin through the iced runtime.
    ///
    /// The state changes once the runtime delivers the message back to
    /// [`PluginManager::update`]. Use [`PluginHandle::apply`] when the change
    /// has to be visible immediately.
    pub fn dispatch(&self, input: P::Input) -> Task<PluginMessage> {
        Task::done(self.message(input))
    }

    /// Wrap an input into a routable [`PluginMessage`]
    pub fn message(&self, input: P::Input) -> PluginMessage {
        PluginMessage::new(self.plugin_index, P::Message::from(input))
    }

    /// Apply an input to the plugin state right away.
    ///
    /// The state is updated before this returns; the task holds whatever
    /// background work the plugin scheduled and must be handed back to the
    /// runtime.
    pub fn apply(&self, manager: &mut PluginManager, input: P::Input) -> Task<PluginMessage> {
        manager.update(self.message(input))
    }

    /// Subscribe to the plugin's outputs.
    ///
    /// # Example
    /// ```ignore
    /// fn subscription(&self) -> Subscription<Message> {
    ///     Subscription::batch([
    ///         self.plugins.subscriptions().map(Message::Plugin),
    ///         self.meal_plan.listen().map(Message::MealPlan),
    ///     ])
    /// }
    /// ```
    pub fn listen(&self) -> iced::Subscription<P::Output> {
        struct ListenState<O> {
            plugin_index: usize,
            output_type_id: TypeId,
            registry: OutputRegistry,
            _phantom: std::marker::PhantomData<O>,
        }

        impl<O> std::hash::Hash for ListenState<O> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.plugin_index.hash(state);
                std::any::type_name::<O>().hash(state);
            }
        }

        impl<O> Clone for ListenState<O> {
            fn clone(&self) -> Self {
                Self {
                    plugin_index: self.plugin_index,
                    output_type_id: self.output_type_id,
                    registry: Arc::clone(&self.registry),
                    _phantom: std::marker::PhantomData,
                }
            }
        }

        fn create_stream<O: Clone + Send + Sync + 'static>(
            state: &ListenState<O>,
        ) -> iced::futures::stream::BoxStream<'static, O> {
            Box::pin(output_listener::<O>(
                state.plugin_index,
                state.output_type_id,
                Arc::clone(&state.registry),
            ))
        }

        let state = ListenState::<P::Output> {
            plugin_index: self.plugin_index,
            output_type_id: TypeId::of::<P::Output>(),
            registry: Arc::clone(&self.output_registry),
            _phantom: std::marker::PhantomData,
        };

        iced::Subscription::run_with(state, create_stream::<P::Output>)
    }
}

/// Type-erased message addressed to one installed plugin
#[derive(Clone, Debug)]
pub struct PluginMessage {
    plugin_index: usize,
    message: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl PluginMessage {
    fn new<M: 'static + Send + Sync>(plugin_index: usize, message: M) -> Self {
        Self {
            plugin_index,
            type_id: TypeId::of::<M>(),
            message: Arc::new(message),
        }
    }

    pub fn plugin_index(&self) -> usize {
        self.plugin_index
    }
}

fn plugin_subscription_fn<P: Plugin + 'static>(
    state: &dyn Any,
    plugin: &AnyRef,
    plugin_index: usize,
) -> Subscription<PluginMessage> {
    let (Some(typed_state), Some(typed_plugin)) = (
        state.downcast_ref::<P::State>(),
        plugin.downcast_ref::<Arc<P>>(),
    ) else {
        return Subscription::none();
    };

    typed_plugin
        .subscription(typed_state)
        .with(plugin_index)
        .map(|(plugin_index, msg)| PluginMessage::new(plugin_index, msg))
}

/// Type-erased output emitted by one installed plugin
#[derive(Clone)]
pub struct PluginOutput {
    plugin_index: usize,
    output: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl PluginOutput {
    fn new<O: 'static + Send + Sync>(plugin_index: usize, output: O) -> Self {
        Self {
            plugin_index,
            type_id: TypeId::of::<O>(),
            output: Arc::new(output),
        }
    }

    pub fn plugin_index(&self) -> usize {
        self.plugin_index
    }

    pub fn downcast<O: 'static>(&self) -> Option<&O> {
        if self.type_id == TypeId::of::<O>() {
            self.output.downcast_ref::<O>()
        } else {
            None
        }
    }
}

impl std::fmt::Debug for PluginOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PluginOutput {{ plugin_index: {}, type_id: {:?} }}",
            self.plugin_index, self.type_id
        )
    }
}

type AnyRef = dyn Any + Send + Sync;
type AnyPlugin = Arc<dyn Any + Send + Sync>;
type AnyMessage = Arc<dyn Any + Send + Sync>;
type UpdateFn =
    Box<dyn Fn(&mut dyn Any, AnyMessage) -> (Task<PluginMessage>, Option<PluginOutput>) + Send + Sync>;

struct PluginEntry {
    name: &'static str,
    state: Box<dyn Any + Send>,
    state_type_id: TypeId,
    message_type_id: TypeId,
    plugin: AnyPlugin,
    plugin_index: usize,
    update_fn: UpdateFn,
    subscription_fn: fn(&dyn Any, &AnyRef, usize) -> Subscription<PluginMessage>,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("name", &self.name)
            .field("plugin_index", &self.plugin_index)
            .field("state_type_id", &self.state_type_id)
            .field("message_type_id", &self.message_type_id)
            .finish()
    }
}

/// Owner of every installed plugin and its state.
///
/// Embed one in the application struct and forward plugin messages to
/// [`PluginManager::update`].
///
/// # Example
/// ```ignore
/// struct App {
///     plugins: PluginManager,
///     meal_plan: PluginHandle<MealPlanPlugin>,
/// }
/// ```
pub struct PluginManager {
    plugins: Vec<PluginEntry>,
    output_registry: OutputRegistry,
    init_tasks: Vec<Task<PluginMessage>>,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.plugins)
            .field("pending_init_tasks", &self.init_tasks.len())
            .finish()
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            output_registry: Arc::new(Mutex::new(HashMap::new())),
            init_tasks: Vec::new(),
        }
    }

    /// Install a plugin and return its handle.
    ///
    /// A plugin type is installed at most once: installing a second plugin
    /// with the same state type hands back the handle of the first one and
    /// drops the newcomer. The init task is kept until
    /// [`PluginManager::take_init_task`] is called.
    pub fn install<P>(&mut self, plugin: P) -> PluginHandle<P>
    where
        P: Plugin + 'static,
    {
        if let Some(existing) = self.handle::<P>() {
            warn!(
                plugin = plugin.name(),
                index = existing.index(),
                "plugin already installed, reusing the existing instance"
            );
            return existing;
        }

        let name = plugin.name();
        let plugin = Arc::new(plugin);
        let (state, init_task) = plugin.init();
        let plugin_index = self.plugins.len();

        let plugin_for_update = Arc::clone(&plugin);
        let update_fn: UpdateFn = Box::new(move |state: &mut dyn Any, message: AnyMessage| {
            if let Some(msg) = message.downcast_ref::<P::Message>()
                && let Some(typed_state) = state.downcast_mut::<P::State>()
            {
                let (task, output) = plugin_for_update.update(typed_state, msg.clone());
                let task = task.map(move |plugin_msg| PluginMessage::new(plugin_index, plugin_msg));
                let plugin_output = output.map(|o| PluginOutput::new(plugin_index, o));
                (task, plugin_output)
            } else {
                (Task::none(), None)
            }
        });

        self.plugins.push(PluginEntry {
            name,
            state: Box::new(state),
            state_type_id: TypeId::of::<P::State>(),
            message_type_id: TypeId::of::<P::Message>(),
            plugin: Arc::new(plugin),
            plugin_index,
            update_fn,
            subscription_fn: plugin_subscription_fn::<P>,
        });
        self.init_tasks
            .push(init_task.map(move |msg| PluginMessage::new(plugin_index, msg)));

        debug!(plugin = name, index = plugin_index, "plugin installed");
        PluginHandle::new(plugin_index, Arc::clone(&self.output_registry))
    }

    /// Hand over the init tasks of every plugin installed so far, batched.
    /// Return this from the application's constructor.
    pub fn take_init_task(&mut self) -> Task<PluginMessage> {
        Task::batch(std::mem::take(&mut self.init_tasks))
    }

    /// Route a message to its plugin and deliver any output to listeners.
    ///
    /// # Example
    /// ```ignore
    /// match message {
    ///     Message::Plugin(plugin_msg) => self.plugins.update(plugin_msg).map(Message::Plugin),
    ///     // ...
    /// }
    /// ```
    pub fn update(&mut self, message: PluginMessage) -> Task<PluginMessage> {
        let plugin_index = message.plugin_index;

        let Some(entry) = self.plugins.get_mut(plugin_index) else {
            warn!(index = plugin_index, "message for unknown plugin dropped");
            return Task::none();
        };

        if entry.message_type_id != message.type_id {
            warn!(
                plugin = entry.name,
                "message type does not match plugin, dropped"
            );
            return Task::none();
        }

        let (task, output) = (entry.update_fn)(entry.state.as_mut(), Arc::clone(&message.message));

        if let Some(output) = output
            && let Ok(mut registry) = self.output_registry.lock()
            && let Some(senders) = registry.get_mut(&plugin_index)
        {
            senders.retain(|sender| sender.unbounded_send(output.clone()).is_ok());
        }

        task
    }

    /// Subscriptions of every installed plugin, for the application's
    /// `subscription` function
    pub fn subscriptions(&self) -> Subscription<PluginMessage> {
        let subs: Vec<Subscription<PluginMessage>> = self
            .plugins
            .iter()
            .map(|entry| {
                (entry.subscription_fn)(
                    entry.state.as_ref(),
                    entry.plugin.as_ref(),
                    entry.plugin_index,
                )
            })
            .collect();

        Subscription::batch(subs)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Names of the installed plugins, in install order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name).collect()
    }

    /// Handle of the installed plugin of type `P`, if any
    pub fn handle<P: Plugin>(&self) -> Option<PluginHandle<P>> {
        self.entry_of::<P>()
            .map(|entry| PluginHandle::new(entry.plugin_index, Arc::clone(&self.output_registry)))
    }

    pub fn get_plugin_state<P: Plugin>(&self) -> Option<&P::State> {
        self.entry_of::<P>()
            .and_then(|entry| entry.state.downcast_ref::<P::State>())
    }

    pub fn get_plugin_state_mut<P: Plugin>(&mut self) -> Option<&mut P::State> {
        self.plugins
            .iter_mut()
            .find(|p| {
                p.state_type_id == TypeId::of::<P::State>()
                    && p.message_type_id == TypeId::of::<P::Message>()
            })
            .and_then(|entry| entry.state.downcast_mut::<P::State>())
    }

    fn entry_of<P: Plugin>(&self) -> Option<&PluginEntry> {
        self.plugins.iter().find(|p| {
            p.state_type_id == TypeId::of::<P::State>()
                && p.message_type_id == TypeId::of::<P::Message>()
        })
    }
}

/// Collects plugins before the application starts
pub struct PluginManagerBuilder {
    manager: PluginManager,
}

impl PluginManagerBuilder {
    pub fn new() -> Self {
        Self {
            manager: PluginManager::new(),
        }
    }

    /// Install a plugin and keep its handle
    pub fn install<P>(&mut self, plugin: P) -> PluginHandle<P>
    where
        P: Plugin + 'static,
    {
        self.manager.install(plugin)
    }

    /// Install a plugin whose handle is not needed up front
    pub fn with_plugin<P>(mut self, plugin: P) -> Self
    where
        P: Plugin + 'static,
    {
        let _ = self.manager.install(plugin);
        self
    }

    /// Finish building. The task starts every plugin's init work.
    pub fn build(mut self) -> (PluginManager, Task<PluginMessage>) {
        let init_task = self.manager.take_init_task();
        (self.manager, init_task)
    }
}

impl Default for PluginManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
