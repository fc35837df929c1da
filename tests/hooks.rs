use cambium::{h, init, HookSet, MemoryHandle, Module, Sink, VNode, VNodeData};


use support_::Recorder;

#[test]
fn init_hooks_rewrite_the_config_before_materialization() {
	support_::init_tracing();
	let patcher = init(Vec::new());
	let container = patcher.sink().create_element("div", None);

	let widget = h(
		"widget",
		VNodeData::new().hook(HookSet::new().on_init(|node| {
			if let Some(data) = node.data.as_mut() {
				data.ns = Some("urn:custom".to_owned());
			}
		})),
		(),
	);
	let _tree = patcher.patch_handle(container.clone(), h("div", VNodeData::new(), vec![widget]));

	assert_eq!(container.children()[0].namespace().as_deref(), Some("urn:custom"));
}

#[test]
fn create_hooks_nest_around_child_materialization() {
	support_::init_tracing();
	let recorder = Recorder::new();
	let patcher = init(vec![Module::new().on_create({
		let recorder = recorder.clone();
		move |empty, new| {
			assert_eq!(empty.sel.as_deref(), Some(""));
			assert!(empty.target.is_none());
			recorder.log(format!("module {}", new.sel.as_deref().unwrap_or("?")));
		}
	})]);
	let container = patcher.sink().create_element("div", None);

	let own = |recorder: &Recorder| {
		let recorder = recorder.clone();
		HookSet::new().on_create(move |empty, new| {
			assert_eq!(empty.sel.as_deref(), Some(""));
			recorder.log(format!("own {}", new.sel.as_deref().unwrap_or("?")));
		})
	};
	let tree = h(
		"div",
		VNodeData::new(),
		vec![h(
			"section",
			VNodeData::new().hook(own(&recorder)),
			vec![h("span", VNodeData::new().hook(own(&recorder)), "x")],
		)],
	);
	let _tree = patcher.patch_handle(container, tree);

	assert_eq!(
		recorder.take(),
		vec!["module section", "module span", "own span", "own section"]
	);
}

#[test]
fn insert_hooks_fire_after_the_whole_structure_is_attached() {
	support_::init_tracing();
	let recorder = Recorder::new();
	let patcher = init(Vec::new());
	let container = patcher.sink().create_element("main", None);
	let expected = "<main><article><b>deep</b></article><aside></aside></main>";

	let observing = |label: &str| {
		let recorder = recorder.clone();
		let container = container.clone();
		let label = label.to_owned();
		let expected = expected.to_owned();
		HookSet::new().on_insert(move |_| {
			recorder.log(format!(
				"insert {} complete={}",
				label,
				container.to_markup() == expected
			));
		})
	};

	let tree = h(
		"main",
		VNodeData::new(),
		vec![
			h(
				"article",
				VNodeData::new().hook(observing("article")),
				vec![h("b", VNodeData::new().hook(observing("b")), "deep")],
			),
			h("aside", VNodeData::new().hook(observing("aside")), ()),
		],
	);
	let _tree = patcher.patch_handle(container.clone(), tree);

	assert_eq!(
		recorder.take(),
		vec![
			"insert b complete=true",
			"insert article complete=true",
			"insert aside complete=true",
		]
	);
}

#[test]
fn patch_hooks_run_in_document_order_around_children() {
	support_::init_tracing();
	let recorder = Recorder::new();
	let patcher = init(vec![Module::new().on_update({
		let recorder = recorder.clone();
		move |_, new| recorder.log(format!("update-mod {}", new.sel.as_deref().unwrap_or("?")))
	})]);
	let container = patcher.sink().create_element("div", None);

	let hooked = |sel: &'static str, recorder: &Recorder, children: Vec<VNode<MemoryHandle>>| {
		let hooks = HookSet::new()
			.on_prepatch({
				let recorder = recorder.clone();
				move |_, _| recorder.log(format!("prepatch {}", sel))
			})
			.on_update({
				let recorder = recorder.clone();
				move |_, _| recorder.log(format!("update {}", sel))
			})
			.on_postpatch({
				let recorder = recorder.clone();
				move |_, _| recorder.log(format!("postpatch {}", sel))
			});
		h(sel, VNodeData::new().hook(hooks), children)
	};
	let build = |recorder: &Recorder| {
		h(
			"div",
			VNodeData::new(),
			vec![hooked("outer", recorder, vec![hooked("inner", recorder, Vec::new())])],
		)
	};

	let tree = patcher.patch_handle(container, build(&recorder));
	recorder.take();

	let _tree = patcher.patch(tree, build(&recorder));
	assert_eq!(
		recorder.take(),
		vec![
			"update-mod div",
			"prepatch outer",
			"update-mod outer",
			"update outer",
			"prepatch inner",
			"update-mod inner",
			"update inner",
			"postpatch inner",
			"postpatch outer",
		]
	);
}

#[test]
fn pre_and_post_bracket_every_call() {
	support_::init_tracing();
	let recorder = Recorder::new();
	let patcher = init(vec![Module::new()
		.on_pre({
			let recorder = recorder.clone();
			move || recorder.log("pre")
		})
		.on_post({
			let recorder = recorder.clone();
			move || recorder.log("post")
		})]);
	let container = patcher.sink().create_element("div", None);

	let build = |recorder: &Recorder| {
		let recorder = recorder.clone();
		h(
			"div",
			VNodeData::new(),
			vec![h(
				"span",
				VNodeData::new().hook(HookSet::new().on_insert(move |_| recorder.log("insert span"))),
				(),
			)],
		)
	};

	let tree = patcher.patch_handle(container, build(&recorder));
	assert_eq!(recorder.take(), vec!["pre", "insert span", "post"]);

	// Nothing new is materialized, so the insert hook stays quiet.
	let _tree = patcher.patch(tree, build(&recorder));
	assert_eq!(recorder.take(), vec!["pre", "post"]);
}
